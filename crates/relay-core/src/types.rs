//! Common types for the relay client
//!
//! Centralizes type definitions to avoid duplication across modules.

use std::net::SocketAddr;
use std::time::Duration;

/// Network endpoint identity of a backend server
pub type Address = SocketAddr;

/// Timeout value meaning "no timeout"
pub const NO_TIMEOUT: Duration = Duration::ZERO;

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
