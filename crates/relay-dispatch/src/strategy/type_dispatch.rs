//! Type-dispatch combinator
//!
//! A tag function maps each request to a type tag; tags select a child
//! through an explicit mapping, with an optional default child for
//! unmapped tags.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use relay_core::Address;
use tracing::{debug, trace};

use super::{Strategy, StrategyRef};
use crate::error::DispatchError;
use crate::pool::ConnectionPool;
use crate::sender::{Callback, Sender, SenderRef};

/// Request-to-tag extraction function
pub type TypeTagFn<Req, T> = Arc<dyn Fn(&Req) -> T + Send + Sync>;

/// Tag-keyed dispatch over a child mapping.
///
/// Compilation is strict by default: every mapped child, and the default if
/// one is configured, must compile or the whole strategy is unavailable.
/// [`with_partial_coverage`](Self::with_partial_coverage) keeps whatever
/// compiled instead; requests whose tag has no live child then fall to the
/// default, or fail with `NoSenderAvailable`.
pub struct TypeDispatch<Req, Res, T> {
    type_fn: TypeTagFn<Req, T>,
    mapping: Vec<(T, StrategyRef<Req, Res>)>,
    default: Option<StrategyRef<Req, Res>>,
    partial_coverage: bool,
}

impl<Req, Res, T> TypeDispatch<Req, Res, T>
where
    T: Eq + Hash + Send + Sync,
{
    /// Create from a tag function and `(tag, child)` pairs
    pub fn new(
        type_fn: impl Fn(&Req) -> T + Send + Sync + 'static,
        mapping: Vec<(T, StrategyRef<Req, Res>)>,
    ) -> Self {
        Self {
            type_fn: Arc::new(type_fn),
            mapping,
            default: None,
            partial_coverage: false,
        }
    }

    /// Child for requests whose tag is not in the mapping
    pub fn with_default(mut self, default: StrategyRef<Req, Res>) -> Self {
        self.default = Some(default);
        self
    }

    /// Accept partially-compiled mappings instead of requiring every mapped
    /// child to be available
    pub fn with_partial_coverage(mut self) -> Self {
        self.partial_coverage = true;
        self
    }
}

impl<Req, Res, T> Strategy<Req, Res> for TypeDispatch<Req, Res, T>
where
    Req: 'static,
    Res: 'static,
    T: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn addresses(&self) -> HashSet<Address> {
        self.mapping
            .iter()
            .flat_map(|(_, child)| child.addresses())
            .chain(self.default.iter().flat_map(|child| child.addresses()))
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let mut senders = HashMap::new();
        for (tag, child) in &self.mapping {
            match child.compile(pool) {
                Some(sender) => {
                    senders.insert(tag.clone(), sender);
                }
                None if self.partial_coverage => {
                    debug!(child = child.name(), "Skipping unavailable mapped child");
                }
                None => return None,
            }
        }

        let default = match &self.default {
            Some(child) => match child.compile(pool) {
                Some(sender) => Some(sender),
                None if self.partial_coverage => None,
                None => return None,
            },
            None => None,
        };

        if senders.is_empty() && default.is_none() {
            return None;
        }

        Some(Arc::new(TypeDispatchSender {
            type_fn: self.type_fn.clone(),
            senders,
            default,
        }))
    }

    fn name(&self) -> &'static str {
        "TypeDispatch"
    }
}

struct TypeDispatchSender<Req, Res, T> {
    type_fn: TypeTagFn<Req, T>,
    senders: HashMap<T, SenderRef<Req, Res>>,
    default: Option<SenderRef<Req, Res>>,
}

impl<Req, Res, T> Sender<Req, Res> for TypeDispatchSender<Req, Res, T>
where
    T: Eq + Hash + Send + Sync,
{
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>) {
        let tag = (self.type_fn)(&request);
        match self.senders.get(&tag).or(self.default.as_ref()) {
            Some(sender) => {
                trace!(mapped = self.senders.contains_key(&tag), "Type selection");
                sender.send_request(request, timeout, cb);
            }
            None => cb(Err(DispatchError::NoSenderAvailable)),
        }
    }
}
