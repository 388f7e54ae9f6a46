//! Sharding combinator
//!
//! A shard function maps each request to a child position. Children are
//! compiled in their original positions; a slot whose child failed to
//! compile is kept as a hole, and requests landing on a hole (or outside
//! the child list) fail with `NoSenderAvailable`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use relay_core::Address;
use tracing::{debug, trace};

use super::{Strategy, StrategyRef};
use crate::error::DispatchError;
use crate::pool::ConnectionPool;
use crate::sender::{Callback, Sender, SenderRef};

/// Request-to-shard mapping function
pub type ShardFn<Req> = Arc<dyn Fn(&Req) -> usize + Send + Sync>;

/// Positional sharding over an ordered child list
pub struct Sharding<Req, Res> {
    shard_fn: ShardFn<Req>,
    children: Vec<StrategyRef<Req, Res>>,
    min_active_sub_strategies: usize,
}

impl<Req, Res> Sharding<Req, Res> {
    /// Create from a shard function and an ordered child list
    pub fn new(
        shard_fn: impl Fn(&Req) -> usize + Send + Sync + 'static,
        children: Vec<StrategyRef<Req, Res>>,
    ) -> Self {
        Self {
            shard_fn: Arc::new(shard_fn),
            children,
            min_active_sub_strategies: 1,
        }
    }

    /// Require at least `min` children to compile, or the whole strategy is
    /// unavailable
    pub fn with_min_active_sub_strategies(mut self, min: usize) -> Self {
        self.min_active_sub_strategies = min;
        self
    }
}

impl<Req: 'static, Res: 'static> Strategy<Req, Res> for Sharding<Req, Res> {
    fn addresses(&self) -> HashSet<Address> {
        self.children
            .iter()
            .flat_map(|child| child.addresses())
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let senders: Vec<Option<SenderRef<Req, Res>>> = self
            .children
            .iter()
            .map(|child| child.compile(pool))
            .collect();

        let active = senders.iter().filter(|s| s.is_some()).count();
        if active < self.min_active_sub_strategies.max(1) {
            debug!(
                active = active,
                required = self.min_active_sub_strategies,
                "Too few active shards"
            );
            return None;
        }

        Some(Arc::new(ShardingSender {
            shard_fn: self.shard_fn.clone(),
            senders,
        }))
    }

    fn name(&self) -> &'static str {
        "Sharding"
    }
}

struct ShardingSender<Req, Res> {
    shard_fn: ShardFn<Req>,
    senders: Vec<Option<SenderRef<Req, Res>>>,
}

impl<Req, Res> Sender<Req, Res> for ShardingSender<Req, Res> {
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>) {
        let shard = (self.shard_fn)(&request);
        match self.senders.get(shard).and_then(|slot| slot.as_ref()) {
            Some(sender) => {
                trace!(shard = shard, "Shard selection");
                sender.send_request(request, timeout, cb);
            }
            None => {
                trace!(shard = shard, "No sender for shard");
                cb(Err(DispatchError::NoSenderAvailable));
            }
        }
    }
}
