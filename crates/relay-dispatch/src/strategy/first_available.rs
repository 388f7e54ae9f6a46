//! First-available combinator
//!
//! Routes every request to the first child that compiled successfully.
//! Fallback to a later child happens between compilations, never
//! mid-request: a dispatch failure propagates to the caller as-is.

use std::collections::HashSet;

use relay_core::Address;
use tracing::debug;

use super::{Strategy, StrategyRef};
use crate::pool::ConnectionPool;
use crate::sender::SenderRef;

/// Ordered preference list of sub-strategies
pub struct FirstAvailable<Req, Res> {
    children: Vec<StrategyRef<Req, Res>>,
}

impl<Req, Res> FirstAvailable<Req, Res> {
    /// Create from an ordered child list (highest preference first)
    pub fn new(children: Vec<StrategyRef<Req, Res>>) -> Self {
        Self { children }
    }
}

impl<Req: 'static, Res: 'static> Strategy<Req, Res> for FirstAvailable<Req, Res> {
    fn addresses(&self) -> HashSet<Address> {
        self.children
            .iter()
            .flat_map(|child| child.addresses())
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        for (index, child) in self.children.iter().enumerate() {
            if let Some(sender) = child.compile(pool) {
                debug!(
                    child = child.name(),
                    index = index,
                    "Compiled to first available child"
                );
                // No wrapper needed: the chosen child's sender is the
                // compiled sender.
                return Some(sender);
            }
        }
        None
    }

    fn name(&self) -> &'static str {
        "FirstAvailable"
    }
}
