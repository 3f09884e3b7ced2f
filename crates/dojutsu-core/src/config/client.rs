//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::duration_secs;
use crate::endpoint;
use crate::error::ConfigError;
use crate::provider::Provider;
use dojutsu_protocol::DEFAULT_PACKAGE;

/// Top-level layout of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// `[client]` section
    pub client: ClientConfig,
}

/// Settings for talking to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Unix domain socket the daemon listens on
    pub socket_path: PathBuf,

    /// Module identifier sent as `package` in every request
    pub package: String,

    /// Upper bound for one round trip, in seconds
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// Upper bound for establishing the connection, in seconds
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Provider used by pipeline operations
    pub provider: Provider,

    /// Model override (daemon default when unset)
    pub model: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: endpoint::default_socket_path(),
            package: DEFAULT_PACKAGE.to_string(),
            timeout: endpoint::DEFAULT_TIMEOUT,
            connect_timeout: endpoint::DEFAULT_CONNECT_TIMEOUT,
            provider: Provider::default(),
            model: None,
        }
    }
}

impl ClientConfig {
    /// Check that the settings describe a usable endpoint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("socket_path must not be empty".into()));
        }
        if self.package.trim().is_empty() {
            return Err(ConfigError::Invalid("package must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "connect_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.package, "dojutsu-agent");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            [client]
            socket_path = "/run/user/1000/dojutsu.sock"
            timeout = 45
            provider = "anthropic"
            "#,
        )
        .unwrap();

        assert_eq!(
            file.client.socket_path,
            PathBuf::from("/run/user/1000/dojutsu.sock")
        );
        assert_eq!(file.client.timeout, Duration::from_secs(45));
        assert_eq!(file.client.connect_timeout, Duration::from_secs(5));
        assert_eq!(file.client.provider, Provider::Anthropic);
        assert_eq!(file.client.package, "dojutsu-agent");
        assert!(file.client.model.is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(file.client.socket_path, endpoint::default_socket_path());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_blank_package() {
        let config = ClientConfig {
            package: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
