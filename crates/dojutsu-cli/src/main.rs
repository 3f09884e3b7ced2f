//! Dojutsu CLI
//!
//! Invokes operations on the Dojutsu daemon over its Unix socket:
//! - Pipeline operations (run, byakugan)
//! - Skill catalogue queries (count, list, check)
//! - Raw calls to any operation the daemon exposes

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dojutsu::commands::{self, PipelineArgs};
use dojutsu::ipc::DojutsuClient;
use dojutsu_core::config::{self, ClientConfig};
use dojutsu_core::endpoint::SOCKET_ENV_VAR;
use dojutsu_core::Provider;

#[derive(Parser)]
#[command(name = "dojutsu")]
#[command(author, version, about = "Client for the Dojutsu coding-agent daemon")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Daemon socket path (overrides config)
    #[arg(short, long, global = true, env = SOCKET_ENV_VAR)]
    socket: Option<PathBuf>,

    /// Round-trip timeout in seconds (overrides config)
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full coding pipeline on a task
    Run {
        #[command(flatten)]
        pipeline: PipelineOpts,
        /// Ask the daemon for a verbose pipeline trace
        #[arg(long)]
        trace: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the structural analysis step only
    Byakugan {
        #[command(flatten)]
        pipeline: PipelineOpts,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Query the daemon's skill catalogue
    Skills {
        #[command(subcommand)]
        action: SkillsAction,
    },

    /// Show client and daemon versions
    Version {
        /// Print the daemon's answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke any daemon operation with positional arguments
    Call {
        /// Operation name
        function: String,
        /// Positional arguments, sent in order
        args: Vec<String>,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct PipelineOpts {
    /// Task description
    task: String,
    /// LLM provider (overrides config)
    #[arg(short, long)]
    provider: Option<Provider>,
    /// Model name (provider default if omitted)
    #[arg(short, long)]
    model: Option<String>,
    /// API key (read from the provider's environment variable if omitted)
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum SkillsAction {
    /// Number of indexed skills
    Count,
    /// List indexed skills
    List,
    /// Scan a skill document for malicious patterns
    Check {
        /// Skill file to scan
        path: PathBuf,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands work without a reachable daemon or a valid config
    if let Commands::Config { action } = &cli.command {
        let path = cli.config.as_deref();
        return match action {
            ConfigAction::Show => commands::config_show(path),
            ConfigAction::Path => commands::config_path(path),
            ConfigAction::Init { force } => commands::config_init(path, *force),
        };
    }

    let settings = load_settings(&cli)?;
    let client = DojutsuClient::from_config(&settings);
    tracing::debug!(
        socket = %client.socket_path().display(),
        timeout_secs = client.timeout().as_secs(),
        "Client configured"
    );

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    match cli.command {
        Commands::Run {
            pipeline,
            trace,
            json,
        } => {
            let args = pipeline.resolve(&settings);
            commands::run_command(&client, args, trace, json, &cancel).await?;
        }

        Commands::Byakugan { pipeline, json } => {
            let args = pipeline.resolve(&settings);
            commands::byakugan_command(&client, args, json, &cancel).await?;
        }

        Commands::Skills { action } => match action {
            SkillsAction::Count => commands::skills_count_command(&client, &cancel).await?,
            SkillsAction::List => commands::skills_list_command(&client, &cancel).await?,
            SkillsAction::Check { path, json } => {
                commands::skills_check_command(&client, &path, json, &cancel).await?
            }
        },

        Commands::Version { json } => {
            commands::version_command(&client, json, &cancel).await?;
        }

        Commands::Call {
            function,
            args,
            json,
        } => {
            commands::call_command(&client, &function, &args, json, &cancel).await?;
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

impl PipelineOpts {
    fn resolve<'a>(&'a self, settings: &'a ClientConfig) -> PipelineArgs<'a> {
        PipelineArgs {
            task: &self.task,
            api_key: self.api_key.as_deref(),
            provider: self.provider.unwrap_or(settings.provider),
            model: self.model.as_deref().or(settings.model.as_deref()),
        }
    }
}

/// Load the config file and apply command-line overrides
fn load_settings(cli: &Cli) -> Result<ClientConfig> {
    let file = match &cli.config {
        Some(path) => config::load_or_default(Some(path))
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => config::load_or_default(None).unwrap_or_else(|e| {
            tracing::warn!("Failed to load default config: {}", e);
            Default::default()
        }),
    };

    let mut settings = file.client;
    if let Some(socket) = &cli.socket {
        settings.socket_path = socket.clone();
    }
    if let Some(secs) = cli.timeout {
        settings.timeout = Duration::from_secs(secs);
    }

    settings.validate().context("Invalid client configuration")?;
    Ok(settings)
}

/// Cancel in-flight requests on Ctrl+C or SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, cancelling request...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, cancelling request...");
            }
        }

        cancel.cancel();
    });
}
