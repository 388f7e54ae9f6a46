//! Round-robin combinator
//!
//! Rotates strictly over the children that compiled, in submission order.
//! The cursor is per compiled sender: recompiling resets the rotation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relay_core::Address;
use tracing::trace;

use super::{Strategy, StrategyRef};
use crate::pool::ConnectionPool;
use crate::sender::{Callback, Sender, SenderRef};

/// Ordered list of sub-strategies dispatched in rotation
pub struct RoundRobin<Req, Res> {
    children: Vec<StrategyRef<Req, Res>>,
}

impl<Req, Res> RoundRobin<Req, Res> {
    /// Create from an ordered child list
    pub fn new(children: Vec<StrategyRef<Req, Res>>) -> Self {
        Self { children }
    }
}

impl<Req: 'static, Res: 'static> Strategy<Req, Res> for RoundRobin<Req, Res> {
    fn addresses(&self) -> HashSet<Address> {
        self.children
            .iter()
            .flat_map(|child| child.addresses())
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let senders: Vec<_> = self
            .children
            .iter()
            .filter_map(|child| child.compile(pool))
            .collect();

        if senders.is_empty() {
            return None;
        }

        Some(Arc::new(RoundRobinSender {
            senders,
            cursor: AtomicUsize::new(0),
        }))
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }
}

struct RoundRobinSender<Req, Res> {
    senders: Vec<SenderRef<Req, Res>>,
    cursor: AtomicUsize,
}

impl<Req, Res> Sender<Req, Res> for RoundRobinSender<Req, Res> {
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>) {
        // Wrapping overflow is harmless: the cursor is only used modulo the
        // child count.
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        trace!(index = index, "Round-robin selection");
        self.senders[index].send_request(request, timeout, cb);
    }
}
