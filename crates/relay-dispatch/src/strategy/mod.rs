//! Routing Strategies
//!
//! This module contains the strategy algebra: a leaf strategy targeting a
//! single address and the combinators that compose routing policies out of
//! sub-strategies:
//!
//! - `Single`: the pool's sender for one address
//! - `FirstAvailable`: first child that compiled
//! - `RoundRobin`: strict rotation over compiled children
//! - `RandomSampled`: weight-proportional random selection
//! - `Sharding`: request key selects a child by position
//! - `RendezvousHashing`: highest-random-weight bucket selection
//! - `TypeDispatch`: request tag selects a child by mapping
//! - `FirstValidResult`: fan-out to all children, first valid answer wins
//!
//! # Strategy Hierarchy
//!
//! ```text
//! Strategy tree (immutable value)
//!     │
//!     ▼ compile(pool)
//! ┌─────────────────────────┐
//! │    Compiled Sender      │  (owns cursors, aggregators, RNG state)
//! └───────────┬─────────────┘
//!             │ send_request(request, timeout, callback)
//!             ▼
//! ┌─────────────────────────┐
//! │   Transport senders     │  (resolved from the ConnectionPool)
//! └─────────────────────────┘
//! ```
//!
//! Compilation walks the tree bottom-up against a point-in-time pool
//! snapshot and performs no I/O. Callers recompile whenever pool membership
//! changes; fallback between backends happens between compilations, never
//! mid-request.

mod first_available;
mod first_valid_result;
mod random_sampled;
mod rendezvous;
mod round_robin;
mod sharding;
mod single;
mod type_dispatch;

pub use first_available::FirstAvailable;
pub use first_valid_result::{FirstValidResult, ResultValidator};
pub use random_sampled::RandomSampled;
pub use rendezvous::{BucketScoreFn, HashFn, RendezvousHashing};
pub use round_robin::RoundRobin;
pub use sharding::{ShardFn, Sharding};
pub use single::Single;
pub use type_dispatch::{TypeDispatch, TypeTagFn};

use std::collections::HashSet;
use std::sync::Arc;

use relay_core::{Address, ClientConfig};

use crate::error::DispatchError;
use crate::pool::ConnectionPool;
use crate::sender::SenderRef;

/// Declarative, composable routing policy.
///
/// A strategy is an immutable description: it enumerates the addresses it
/// may target and compiles itself against a pool snapshot into a concrete
/// [`Sender`]. All mutable routing state lives in the compiled sender, so a
/// strategy tree can be shared and recompiled freely.
///
/// [`Sender`]: crate::Sender
pub trait Strategy<Req, Res>: Send + Sync {
    /// Addresses this strategy may dispatch to.
    ///
    /// A superset of what any compiled sender actually hits; used for pool
    /// warm-up before the first compile.
    fn addresses(&self) -> HashSet<Address>;

    /// Compile against a pool snapshot.
    ///
    /// Returns `None` when no viable sender can be produced right now
    /// ("unavailable"). No request has been accepted in that case and no
    /// callback is owed. Callers recompile when pool membership changes.
    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Shared handle to a strategy
pub type StrategyRef<Req, Res> = Arc<dyn Strategy<Req, Res>>;

/// Leaf strategy targeting one backend address
pub fn single<Req: 'static, Res: 'static>(address: Address) -> Single<Req, Res> {
    Single::new(address)
}

/// One [`Single`] strategy per address, ready to feed a combinator
pub fn servers<Req: 'static, Res: 'static>(
    addresses: impl IntoIterator<Item = Address>,
) -> Vec<StrategyRef<Req, Res>> {
    addresses
        .into_iter()
        .map(|addr| Arc::new(Single::new(addr)) as StrategyRef<Req, Res>)
        .collect()
}

/// [`servers`] over the address list of a [`ClientConfig`]
pub fn servers_from_config<Req: 'static, Res: 'static>(
    config: &ClientConfig,
) -> Result<Vec<StrategyRef<Req, Res>>, DispatchError> {
    let addrs = config
        .server_addrs()
        .map_err(|e| DispatchError::InvalidConfig(e.to_string()))?;
    Ok(servers(addrs))
}

/// Route every request to the first child that compiled
pub fn first_available<Req, Res>(children: Vec<StrategyRef<Req, Res>>) -> FirstAvailable<Req, Res> {
    FirstAvailable::new(children)
}

/// Fan every request out to all compiled children, completing with the
/// first valid result
pub fn first_valid_result<Req, Res>(
    children: Vec<StrategyRef<Req, Res>>,
) -> FirstValidResult<Req, Res> {
    FirstValidResult::new(children)
}

/// Rotate strictly over compiled children
pub fn round_robin<Req, Res>(children: Vec<StrategyRef<Req, Res>>) -> RoundRobin<Req, Res> {
    RoundRobin::new(children)
}

/// Pick a compiled child at random with probability proportional to weight
pub fn random_sampled<Req, Res>(
    children: Vec<(u32, StrategyRef<Req, Res>)>,
) -> RandomSampled<Req, Res> {
    RandomSampled::new(children)
}

/// Select a child by position from a request shard key
pub fn sharding<Req, Res>(
    shard_fn: impl Fn(&Req) -> usize + Send + Sync + 'static,
    children: Vec<StrategyRef<Req, Res>>,
) -> Sharding<Req, Res> {
    Sharding::new(shard_fn, children)
}

/// Select the highest-scoring compiled bucket for each request hash
pub fn rendezvous_hashing<Req, Res>(
    hash_fn: impl Fn(&Req) -> u64 + Send + Sync + 'static,
    buckets: Vec<(u64, StrategyRef<Req, Res>)>,
) -> RendezvousHashing<Req, Res> {
    RendezvousHashing::new(hash_fn, buckets)
}

/// Select a child from a request type tag, with an optional default
pub fn type_dispatch<Req, Res, T>(
    type_fn: impl Fn(&Req) -> T + Send + Sync + 'static,
    mapping: Vec<(T, StrategyRef<Req, Res>)>,
) -> TypeDispatch<Req, Res, T>
where
    T: Eq + std::hash::Hash + Send + Sync,
{
    TypeDispatch::new(type_fn, mapping)
}
