//! Well-known daemon endpoint and round-trip defaults

use std::path::PathBuf;
use std::time::Duration;

/// Socket the daemon listens on unless the operator configures another one
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/allpath_runner.sock";

/// Environment variable overriding the socket path
pub const SOCKET_ENV_VAR: &str = "DOJUTSU_SOCKET";

/// Upper bound for a whole round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Upper bound for establishing the connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default socket path
pub fn default_socket_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}
