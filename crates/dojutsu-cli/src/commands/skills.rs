//! Skill catalogue commands

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::ipc::{DojutsuClient, Operation, OperationOutput};
use crate::output::{format_response, format_skill_check};

/// Execute `skills count`
pub async fn skills_count_command(
    client: &DojutsuClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let output = client
        .invoke_with_cancel(&Operation::SkillsCount, cancel)
        .await
        .context("Counting skills failed")?;

    match output {
        OperationOutput::SkillsCount(count) => {
            println!("{}", count);
            Ok(())
        }
        other => anyhow::bail!("Unexpected output: {:?}", other),
    }
}

/// Execute `skills list`
pub async fn skills_list_command(
    client: &DojutsuClient,
    cancel: &CancellationToken,
) -> Result<()> {
    let output = client
        .invoke_with_cancel(&Operation::SkillsList, cancel)
        .await
        .context("Listing skills failed")?;
    let response = match output {
        OperationOutput::SkillsList(response) => response,
        other => anyhow::bail!("Unexpected output: {:?}", other),
    };

    // The listing is usually one preformatted text field
    let mut values = response.fields().values();
    match (values.next().and_then(|v| v.as_str()), values.next()) {
        (Some(text), None) => println!("{}", text),
        _ => println!("{}", format_response(&response)),
    }
    Ok(())
}

/// Execute `skills check` on a skill document
pub async fn skills_check_command(
    client: &DojutsuClient,
    path: &Path,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read skill file: {:?}", path))?;

    let op = Operation::CheckSkill { content };
    let output = client
        .invoke_with_cancel(&op, cancel)
        .await
        .context("Skill check failed")?;
    let check = match output {
        OperationOutput::CheckSkill(check) => check,
        other => anyhow::bail!("Unexpected output: {:?}", other),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&check)?);
    } else {
        println!("{}", format_skill_check(&check));
    }

    if !check.safe {
        anyhow::bail!("Skill {:?} failed the safety check", path);
    }
    Ok(())
}
