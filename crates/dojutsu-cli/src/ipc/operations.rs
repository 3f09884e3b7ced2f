//! Typed views over the daemon's operations
//!
//! The envelope codec treats response fields as an open mapping. This
//! module pins down, per operation name, which positional arguments are
//! sent and which fields are expected back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dojutsu_core::{DojutsuError, Provider};
use dojutsu_protocol::Response;

/// An operation exposed by the daemon, with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Full five-step pipeline on a task
    Run {
        task: String,
        api_key: String,
        provider: Provider,
        model: Option<String>,
        verbose: bool,
    },
    /// Structural analysis only
    Byakugan {
        task: String,
        api_key: String,
        provider: Provider,
        model: Option<String>,
    },
    /// Human-readable listing of indexed skills
    SkillsList,
    /// Number of indexed skills
    SkillsCount,
    /// Pattern scan of a skill document
    CheckSkill { content: String },
    /// Daemon package version and supported providers
    Version,
}

impl Operation {
    /// Function name sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Run { .. } => "run",
            Operation::Byakugan { .. } => "byakugan",
            Operation::SkillsList => "skills_list",
            Operation::SkillsCount => "skills_count",
            Operation::CheckSkill { .. } => "check_skill",
            Operation::Version => "version",
        }
    }

    /// Positional arguments sent on the wire
    ///
    /// An unset model is sent as an empty string so the daemon falls back
    /// to the provider default.
    pub fn args(&self) -> Vec<String> {
        match self {
            Operation::Run {
                task,
                api_key,
                provider,
                model,
                verbose,
            } => vec![
                task.clone(),
                api_key.clone(),
                provider.to_string(),
                model.clone().unwrap_or_default(),
                verbose.to_string(),
            ],
            Operation::Byakugan {
                task,
                api_key,
                provider,
                model,
            } => vec![
                task.clone(),
                api_key.clone(),
                provider.to_string(),
                model.clone().unwrap_or_default(),
            ],
            Operation::CheckSkill { content } => vec![content.clone()],
            Operation::SkillsList | Operation::SkillsCount | Operation::Version => Vec::new(),
        }
    }

    /// Interpret a successful response for this operation
    pub fn interpret(&self, response: Response) -> Result<OperationOutput, DojutsuError> {
        let output = match self {
            Operation::Run { .. } => OperationOutput::Run(parse(self, &response)?),
            Operation::Byakugan { .. } => OperationOutput::Byakugan(parse(self, &response)?),
            Operation::SkillsList => OperationOutput::SkillsList(response),
            Operation::SkillsCount => {
                let count: SkillsCount = parse(self, &response)?;
                OperationOutput::SkillsCount(count.count)
            }
            Operation::CheckSkill { .. } => OperationOutput::CheckSkill(parse(self, &response)?),
            Operation::Version => OperationOutput::Version(parse(self, &response)?),
        };
        Ok(output)
    }
}

/// Result of an [`Operation`], tagged by operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    Run(RunResult),
    Byakugan(ByakuganResult),
    SkillsList(Response),
    SkillsCount(u64),
    CheckSkill(SkillCheck),
    Version(VersionInfo),
}

/// Output of the full pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Structural analysis
    #[serde(default)]
    pub byakugan: String,
    #[serde(default)]
    pub mode_sage: String,
    #[serde(default)]
    pub jougan: String,
    /// Generated output
    pub execution: String,
    /// Skills the pipeline pulled in
    #[serde(default)]
    pub skills_used: Vec<String>,
    /// Seconds spent per pipeline step
    #[serde(default)]
    pub timing: BTreeMap<String, f64>,
    /// Wall-clock seconds for the whole pipeline
    #[serde(default)]
    pub total_time: f64,
}

/// Output of the structural analysis step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByakuganResult {
    pub byakugan: String,
    #[serde(default)]
    pub time: f64,
}

/// Verdict of a skill scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheck {
    pub safe: bool,
    #[serde(default)]
    pub violations: Vec<String>,
}

/// Daemon version information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub providers: Vec<String>,
}

#[derive(Deserialize)]
struct SkillsCount {
    count: u64,
}

fn parse<T: serde::de::DeserializeOwned>(
    op: &Operation,
    response: &Response,
) -> Result<T, DojutsuError> {
    response.parse().map_err(|e| {
        DojutsuError::MalformedResponse(format!(
            "unexpected shape for `{}` response: {}",
            op.name(),
            e
        ))
    })
}
