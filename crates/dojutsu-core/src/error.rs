//! Core error types for the Dojutsu client

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dojutsu_protocol::ProtocolError;
use thiserror::Error;

const START_HINT: &str = "Is the daemon running? Start it with `python allpath-runner.py daemon`";

/// Failure of a single round trip with the daemon
///
/// Every variant is terminal for the call that produced it. Nothing is
/// retried and no variant is converted into another.
#[derive(Error, Debug)]
pub enum DojutsuError {
    /// Socket path does not exist
    #[error("Daemon socket not found at {}. {}", .path.display(), START_HINT)]
    EndpointNotFound { path: PathBuf },

    /// Socket path exists but nothing is listening on it
    #[error("Connection refused at {}. {}", .path.display(), START_HINT)]
    ConnectionRefused { path: PathBuf },

    /// Any other failure while connecting
    #[error("Failed to connect to daemon at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Fault while sending the request or shutting down the write half
    #[error("Failed to write request: {0}")]
    WriteError(#[source] io::Error),

    /// Fault while draining the response stream
    #[error("Failed to read response: {0}")]
    ReadError(#[source] io::Error),

    /// No end-of-stream from the daemon within the allotted time
    #[error(
        "Timed out after {:.1}s waiting for the daemon (limit {:.1}s)",
        .elapsed.as_secs_f64(),
        .limit.as_secs_f64()
    )]
    TimeoutExceeded { elapsed: Duration, limit: Duration },

    /// Caller cancelled the round trip
    #[error("Request cancelled")]
    Cancelled,

    /// Bytes received but not a valid response envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Daemon reported a failure through the `error` field
    #[error("{0}")]
    RemoteOperationError(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Discriminant of [`DojutsuError`] for callers that branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EndpointNotFound,
    ConnectionRefused,
    Connect,
    WriteError,
    ReadError,
    TimeoutExceeded,
    Cancelled,
    MalformedResponse,
    RemoteOperationError,
    InvalidRequest,
    Config,
}

impl DojutsuError {
    /// Classify a failed connect attempt
    pub fn connect_failed(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => DojutsuError::EndpointNotFound { path },
            io::ErrorKind::ConnectionRefused => DojutsuError::ConnectionRefused { path },
            _ => DojutsuError::Connect { path, source: err },
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DojutsuError::EndpointNotFound { .. } => ErrorKind::EndpointNotFound,
            DojutsuError::ConnectionRefused { .. } => ErrorKind::ConnectionRefused,
            DojutsuError::Connect { .. } => ErrorKind::Connect,
            DojutsuError::WriteError(_) => ErrorKind::WriteError,
            DojutsuError::ReadError(_) => ErrorKind::ReadError,
            DojutsuError::TimeoutExceeded { .. } => ErrorKind::TimeoutExceeded,
            DojutsuError::Cancelled => ErrorKind::Cancelled,
            DojutsuError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            DojutsuError::RemoteOperationError(_) => ErrorKind::RemoteOperationError,
            DojutsuError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            DojutsuError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the daemon could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EndpointNotFound | ErrorKind::ConnectionRefused | ErrorKind::Connect
        )
    }
}

impl From<ProtocolError> for DojutsuError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::EmptyOperation => {
                DojutsuError::InvalidRequest(ProtocolError::EmptyOperation.to_string())
            }
            ProtocolError::MalformedResponse(reason) => DojutsuError::MalformedResponse(reason),
            ProtocolError::Serialization(e) => DojutsuError::InvalidRequest(e.to_string()),
            ProtocolError::Io(e) => DojutsuError::ReadError(e),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Unknown provider name
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// No API key passed and none in the environment
    #[error("API key required for {provider}. Pass --api-key or set {env_var}")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },
}
