//! Error types for the dispatch engine

use thiserror::Error;

/// Dispatch error types
///
/// Errors are `Clone` because policy-configured errors (for example the
/// first-valid-result fallback) are re-issued once per request. Compile-time
/// unavailability is not an error: [`Strategy::compile`] returns `None`.
///
/// [`Strategy::compile`]: crate::Strategy::compile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No underlying sender was selectable for this request
    #[error("No sender available for request")]
    NoSenderAvailable,

    /// Every fan-out child responded without a valid result
    #[error("No valid result: {0}")]
    NoValidResult(String),

    /// Transport-level timeout
    #[error("Request timed out")]
    RequestTimeout,

    /// Transport-level connection loss
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
