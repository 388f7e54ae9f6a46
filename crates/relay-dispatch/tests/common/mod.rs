//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relay_core::Address;
use relay_dispatch::{
    Callback, ConnectionPool, ConnectionRegistry, DispatchError, Sender, SenderRef, Strategy,
    StrategyRef,
};

/// Transport stub: records request counts and completes every request
/// synchronously with a fixed outcome.
pub struct StubSender {
    requests: AtomicUsize,
    outcome: Result<Option<u32>, DispatchError>,
}

impl StubSender {
    pub fn new(outcome: Result<Option<u32>, DispatchError>) -> Self {
        Self {
            requests: AtomicUsize::new(0),
            outcome,
        }
    }

    /// Number of requests this stub has accepted
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl Sender<u32, u32> for StubSender {
    fn send_request(&self, _request: u32, _timeout: Duration, cb: Callback<u32>) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        cb(self.outcome.clone());
    }
}

/// Child strategy compiling to a fixed-outcome stub regardless of the pool
pub struct FixedResultStrategy {
    outcome: Result<Option<u32>, DispatchError>,
}

impl FixedResultStrategy {
    pub fn child(outcome: Result<Option<u32>, DispatchError>) -> StrategyRef<u32, u32> {
        Arc::new(Self { outcome })
    }
}

impl Strategy<u32, u32> for FixedResultStrategy {
    fn addresses(&self) -> HashSet<Address> {
        HashSet::new()
    }

    fn compile(&self, _pool: &dyn ConnectionPool<u32, u32>) -> Option<SenderRef<u32, u32>> {
        Some(Arc::new(StubSender::new(self.outcome.clone())))
    }

    fn name(&self) -> &'static str {
        "FixedResult"
    }
}

pub fn test_addr(port: u16) -> Address {
    Address::from(([127, 0, 0, 1], port))
}

/// Register a null-completing stub and return its handle for count checks
pub fn register_stub(registry: &ConnectionRegistry<u32, u32>, port: u16) -> Arc<StubSender> {
    let stub = Arc::new(StubSender::new(Ok(None)));
    registry.register(test_addr(port), stub.clone());
    stub
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
