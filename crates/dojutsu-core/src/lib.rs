//! dojutsu-core: Shared configuration and error types for the Dojutsu client
//!
//! This crate provides the error taxonomy surfaced by every round trip,
//! the client configuration file, the well-known daemon endpoint and the
//! catalogue of downstream LLM providers.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod provider;

pub use error::{ConfigError, DojutsuError, ErrorKind};
pub use provider::Provider;
