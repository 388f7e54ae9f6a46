//! Connection pool lookup and the in-memory connection registry

use std::collections::HashMap;

use parking_lot::RwLock;
use relay_core::Address;
use tracing::info;

use crate::sender::SenderRef;

/// Provider of the currently-live sender for a server address.
///
/// Lookup is non-blocking and safe to call repeatedly during a single
/// compile. The returned handle is a stable reference: it stays valid at
/// least through the synchronous part of the dispatch it is used for, even
/// if the underlying connection drops concurrently.
pub trait ConnectionPool<Req, Res>: Send + Sync {
    /// Get the current active sender for `addr`, or `None` if no connection
    /// exists right now
    fn get(&self, addr: &Address) -> Option<SenderRef<Req, Res>>;
}

/// In-memory registry of live connections.
///
/// Hosts that manage their own transport register a sender when a connection
/// opens and unregister it when the connection drops. Strategies compiled
/// against the registry observe the membership as of the compile moment and
/// must be recompiled after it changes.
pub struct ConnectionRegistry<Req, Res> {
    connections: RwLock<HashMap<Address, SenderRef<Req, Res>>>,
}

impl<Req, Res> ConnectionRegistry<Req, Res> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register the active sender for an address, replacing any previous one
    pub fn register(&self, addr: Address, sender: SenderRef<Req, Res>) {
        info!(address = %addr, "Registering connection");
        let mut connections = self.connections.write();
        connections.insert(addr, sender);
    }

    /// Unregister the sender for an address
    pub fn unregister(&self, addr: &Address) {
        info!(address = %addr, "Unregistering connection");
        let mut connections = self.connections.write();
        connections.remove(addr);
    }

    /// Addresses that currently have a live connection
    pub fn addresses(&self) -> Vec<Address> {
        let connections = self.connections.read();
        connections.keys().copied().collect()
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        let connections = self.connections.read();
        connections.len()
    }

    /// Check whether the registry holds no connections
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<Req, Res> Default for ConnectionRegistry<Req, Res> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res> ConnectionPool<Req, Res> for ConnectionRegistry<Req, Res> {
    fn get(&self, addr: &Address) -> Option<SenderRef<Req, Res>> {
        let connections = self.connections.read();
        connections.get(addr).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::sender::{Callback, Sender};

    struct NoopSender;

    impl Sender<u32, u32> for NoopSender {
        fn send_request(&self, _request: u32, _timeout: Duration, cb: Callback<u32>) {
            cb(Ok(None));
        }
    }

    fn test_addr(port: u16) -> Address {
        Address::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn test_register_and_get() {
        let registry: ConnectionRegistry<u32, u32> = ConnectionRegistry::new();
        let addr = test_addr(9001);

        assert!(registry.get(&addr).is_none());

        registry.register(addr, Arc::new(NoopSender));
        assert!(registry.get(&addr).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry: ConnectionRegistry<u32, u32> = ConnectionRegistry::new();
        let addr = test_addr(9001);

        registry.register(addr, Arc::new(NoopSender));
        registry.unregister(&addr);

        assert!(registry.get(&addr).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_addresses() {
        let registry: ConnectionRegistry<u32, u32> = ConnectionRegistry::new();

        registry.register(test_addr(9001), Arc::new(NoopSender));
        registry.register(test_addr(9002), Arc::new(NoopSender));

        let mut addresses = registry.addresses();
        addresses.sort();
        assert_eq!(addresses, vec![test_addr(9001), test_addr(9002)]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let registry: ConnectionRegistry<u32, u32> = ConnectionRegistry::new();
        let addr = test_addr(9001);

        registry.register(addr, Arc::new(NoopSender));
        registry.register(addr, Arc::new(NoopSender));

        assert_eq!(registry.len(), 1);
    }
}
