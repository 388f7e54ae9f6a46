//! Relay Core - shared library for the relay client crates
//!
//! This crate provides common types and configuration used by
//! relay-dispatch.

pub mod config;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use types::{Address, DEFAULT_TIMEOUT_MS, NO_TIMEOUT};
