//! The sender contract: compiled dispatch functions and their callbacks

use std::sync::Arc;
use std::time::Duration;

use crate::error::DispatchError;

/// Single-shot completion callback for a submitted request.
///
/// Invoked exactly once per accepted request: `Ok(Some(response))` when the
/// transport delivered a response, `Ok(None)` when it completed without a
/// payload, `Err(..)` on failure. `FnOnce` makes the single-completion
/// contract a type-level guarantee.
pub type Callback<Res> = Box<dyn FnOnce(Result<Option<Res>, DispatchError>) + Send>;

/// A compiled dispatch function bound to one or more live connections.
///
/// Produced by [`Strategy::compile`]; owns whatever routing state the policy
/// needs (round-robin cursor, fan-out aggregator, sampling distribution).
/// The transport layer provides the leaf implementations held in the
/// connection pool.
///
/// [`Strategy::compile`]: crate::Strategy::compile
pub trait Sender<Req, Res>: Send + Sync {
    /// Submit a request.
    ///
    /// Never blocks: the outcome is delivered through `cb`. Implementations
    /// may invoke `cb` synchronously when the outcome is already
    /// materialized. A zero `timeout` disables the transport timeout.
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>);
}

/// Shared handle to a sender
pub type SenderRef<Req, Res> = Arc<dyn Sender<Req, Res>>;
