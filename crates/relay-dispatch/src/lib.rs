//! Relay Dispatch - Client-Side Request Routing Engine
//!
//! Routes outgoing requests to live backend connections according to a
//! composable routing strategy.
//!
//! # Architecture
//!
//! ```text
//! Strategy tree (immutable value)
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   compile(pool)         │  Resolves leaves against the pool snapshot
//! │   → Sender | None       │
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │   Compiled Sender       │  Owns routing state (cursor, aggregator)
//! │   send_request(..)      │
//! └─────────────────────────┘
//! ```
//!
//! # Routing Strategies
//!
//! - **Single**: one backend address
//! - **FirstAvailable**: first child that compiled
//! - **RoundRobin**: strict rotation over compiled children
//! - **RandomSampled**: weight-proportional random selection
//! - **Sharding**: request key selects a child by position
//! - **RendezvousHashing**: highest-random-weight bucket selection
//! - **TypeDispatch**: request tag selects a child by mapping
//! - **FirstValidResult**: fan-out, first valid answer wins
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_dispatch::{first_valid_result, servers, ConnectionRegistry};
//!
//! let registry = ConnectionRegistry::new();
//! // ... register transport senders as connections open ...
//!
//! let strategy = first_valid_result(servers([addr_1, addr_2, addr_3]))
//!     .with_no_valid_result_error(DispatchError::NoValidResult("miss".into()));
//!
//! // Recompile whenever pool membership changes
//! let sender = strategy.compile(&registry).expect("no backend available");
//! sender.send_request(request, timeout, callback);
//! ```

// Core modules
mod error;
mod pool;
mod sender;

// Callback adapters (channel/future bridging)
pub mod callback;

// Strategy module (contains all routing strategies)
mod strategy;

// Re-exports: Error types
pub use error::DispatchError;

// Re-exports: Sender and pool contracts
pub use pool::{ConnectionPool, ConnectionRegistry};
pub use sender::{Callback, Sender, SenderRef};

// Re-exports: Strategy trait and implementations
pub use strategy::{
    // Traits and handles
    Strategy, StrategyRef,
    // Constructors
    first_available, first_valid_result, random_sampled, rendezvous_hashing, round_robin,
    servers, servers_from_config, sharding, single, type_dispatch,
    // Strategy types and their function aliases
    BucketScoreFn, FirstAvailable, FirstValidResult, HashFn, RandomSampled, RendezvousHashing,
    ResultValidator, RoundRobin, ShardFn, Sharding, Single, TypeDispatch, TypeTagFn,
};
