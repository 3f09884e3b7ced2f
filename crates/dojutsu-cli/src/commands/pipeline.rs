//! Pipeline commands: `run` and `byakugan`

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use dojutsu_core::Provider;

use crate::ipc::{DojutsuClient, Operation, OperationOutput};
use crate::output::{format_byakugan, format_run_result, print_info};

/// Arguments shared by the pipeline commands
#[derive(Debug, Clone)]
pub struct PipelineArgs<'a> {
    pub task: &'a str,
    /// Explicit API key, else read from the provider's environment variable
    pub api_key: Option<&'a str>,
    pub provider: Provider,
    pub model: Option<&'a str>,
}

/// Execute the run command
pub async fn run_command(
    client: &DojutsuClient,
    args: PipelineArgs<'_>,
    verbose: bool,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let api_key = args.provider.resolve_api_key(args.api_key)?;
    let op = Operation::Run {
        task: args.task.to_string(),
        api_key,
        provider: args.provider,
        model: args.model.map(String::from),
        verbose,
    };

    if !json {
        let model = args.model.unwrap_or(args.provider.default_model());
        print_info(&format!(
            "Running pipeline via {} ({})...",
            args.provider, model
        ));
    }

    let output = client
        .invoke_with_cancel(&op, cancel)
        .await
        .context("Pipeline failed")?;

    match output {
        OperationOutput::Run(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format_run_result(&result));
            }
            Ok(())
        }
        other => anyhow::bail!("Unexpected output: {:?}", other),
    }
}

/// Execute the byakugan command
pub async fn byakugan_command(
    client: &DojutsuClient,
    args: PipelineArgs<'_>,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let api_key = args.provider.resolve_api_key(args.api_key)?;
    let op = Operation::Byakugan {
        task: args.task.to_string(),
        api_key,
        provider: args.provider,
        model: args.model.map(String::from),
    };

    let output = client
        .invoke_with_cancel(&op, cancel)
        .await
        .context("Structural analysis failed")?;

    match output {
        OperationOutput::Byakugan(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format_byakugan(&result));
            }
            Ok(())
        }
        other => anyhow::bail!("Unexpected output: {:?}", other),
    }
}
