//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use dojutsu_core::config::{self, ConfigFile};

fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Show the effective configuration
///
/// Prints the file contents when a file exists, otherwise the defaults.
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_path(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'dojutsu config init' to create one. Built-in defaults:");
        println!("{}", toml::to_string_pretty(&ConfigFile::default())?);
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));

    let loaded: ConfigFile = config::load_config(&path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;
    println!("{}", toml::to_string_pretty(&loaded)?);

    Ok(())
}

/// Print the config file location
pub fn config_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config_path).display());
    Ok(())
}

/// Initialize default configuration
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_path(config_path);

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
    }

    std::fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Created configuration file: {:?}", path));
    Ok(())
}

/// Generate default configuration content
fn generate_default_config() -> String {
    r#"# Dojutsu client configuration

[client]
# Unix socket the daemon listens on (DOJUTSU_SOCKET overrides this)
socket_path = "/tmp/allpath_runner.sock"

# Module identifier sent with every request
package = "dojutsu-agent"

# Upper bound for one request/response round trip, in seconds
timeout = 120

# Upper bound for establishing the connection, in seconds
connect_timeout = 5

# Provider for `run` and `byakugan`:
# groq, openai, anthropic, mistral, openrouter, huggingface
provider = "groq"

# Model override (provider default when unset)
# model = "moonshotai/kimi-k2-instruct-0905"
"#
    .to_string()
}
