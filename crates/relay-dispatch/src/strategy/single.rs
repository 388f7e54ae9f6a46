//! Single-address leaf strategy

use std::collections::HashSet;
use std::marker::PhantomData;

use relay_core::Address;
use tracing::trace;

use super::Strategy;
use crate::pool::ConnectionPool;
use crate::sender::SenderRef;

/// Leaf strategy: the pool's current sender for one address.
///
/// Compiles to whatever the pool holds for the address at the compile
/// moment, or to unavailable when no connection exists right now.
pub struct Single<Req, Res> {
    address: Address,
    _marker: PhantomData<fn() -> (Req, Res)>,
}

impl<Req, Res> Single<Req, Res> {
    /// Create a leaf strategy for `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            _marker: PhantomData,
        }
    }

    /// The address this leaf targets
    pub fn address(&self) -> Address {
        self.address
    }
}

impl<Req: 'static, Res: 'static> Strategy<Req, Res> for Single<Req, Res> {
    fn addresses(&self) -> HashSet<Address> {
        let mut addresses = HashSet::new();
        addresses.insert(self.address);
        addresses
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let sender = pool.get(&self.address);
        if sender.is_none() {
            trace!(address = %self.address, "No live connection for address");
        }
        sender
    }

    fn name(&self) -> &'static str {
        "Single"
    }
}
