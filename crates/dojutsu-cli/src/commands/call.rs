//! Raw call command

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::ipc::DojutsuClient;
use crate::output::format_response;

/// Execute the call command: invoke any operation with positional arguments
pub async fn call_command(
    client: &DojutsuClient,
    function: &str,
    args: &[String],
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let response = client
        .call_with_cancel(function, args, cancel)
        .await
        .with_context(|| format!("`{}` failed", function))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", format_response(&response));
    }
    Ok(())
}
