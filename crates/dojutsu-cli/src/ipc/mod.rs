//! IPC client for communicating with the Dojutsu daemon
//!
//! Uses a Unix domain socket with one connection per request. The request
//! envelope is terminated by a half-close and the response by the daemon
//! closing the connection.

mod client;
mod operations;
mod session;

pub use client::DojutsuClient;
pub use operations::{
    ByakuganResult, Operation, OperationOutput, RunResult, SkillCheck, VersionInfo,
};
pub use session::{SessionState, TransportSession};

// Re-export wire and error types so callers need a single import
pub use dojutsu_core::{DojutsuError, ErrorKind};
pub use dojutsu_protocol::Response;
