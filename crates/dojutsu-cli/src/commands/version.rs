//! Version command implementation

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::ipc::{DojutsuClient, Operation, OperationOutput};
use crate::output::format_version;

/// Execute the version command
///
/// Prints the client version, then asks the daemon for its own.
pub async fn version_command(
    client: &DojutsuClient,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let output = client
        .invoke_with_cancel(&Operation::Version, cancel)
        .await
        .context("Version query failed")?;
    let info = match output {
        OperationOutput::Version(info) => info,
        other => anyhow::bail!("Unexpected output: {:?}", other),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Client version: {}", env!("CARGO_PKG_VERSION"));
        println!("{}", format_version(&info));
    }
    Ok(())
}
