//! Callback adapters
//!
//! Bridges between the single-shot `(result, error)` callback convention and
//! the channel- or future-based handles most callers prefer.

use tokio::sync::oneshot;

use crate::error::DispatchError;
use crate::sender::Callback;

/// A callback that discards the outcome.
///
/// Useful for fire-and-forget submissions and for tests that only observe
/// per-backend request counts.
pub fn ignore<Res: Send + 'static>() -> Callback<Res> {
    Box::new(|_| {})
}

/// Bridge a callback to a oneshot channel.
///
/// The receiver resolves once the request completes; awaiting it is the
/// async equivalent of registering the callback directly. Dropping the
/// receiver orphans the outcome without affecting the dispatch.
pub fn complete_channel<Res: Send + 'static>() -> (
    Callback<Res>,
    oneshot::Receiver<Result<Option<Res>, DispatchError>>,
) {
    let (tx, rx) = oneshot::channel();
    let cb: Callback<Res> = Box::new(move |outcome| {
        let _ = tx.send(outcome);
    });
    (cb, rx)
}
