//! Client for invoking daemon operations
//!
//! Each call opens a fresh Unix socket connection, sends one request
//! envelope, drains the response and closes the connection. Nothing is
//! shared between calls, so a single client can be cloned into as many
//! concurrent tasks as needed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::BytesMut;
use tokio::time::Instant;
use tokio_util::codec::{Decoder, Encoder};
use tokio_util::sync::CancellationToken;

use dojutsu_core::config::ClientConfig;
use dojutsu_core::endpoint::{default_socket_path, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use dojutsu_core::{DojutsuError, Provider};
use dojutsu_protocol::{EnvelopeCodec, Request, Response, DEFAULT_PACKAGE};

use super::operations::{
    ByakuganResult, Operation, OperationOutput, RunResult, SkillCheck, VersionInfo,
};
use super::session::TransportSession;

/// Client for the Dojutsu daemon
#[derive(Debug, Clone)]
pub struct DojutsuClient {
    socket_path: PathBuf,
    package: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl DojutsuClient {
    /// Create a new client for the default socket
    pub fn new() -> Self {
        Self::with_socket_path(default_socket_path())
    }

    /// Create a new client for a custom socket
    pub fn with_socket_path(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            package: DEFAULT_PACKAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            package: config.package.clone(),
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
        }
    }

    /// Override the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the target package
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Get the target package
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Get the per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke `operation` with positional `args`
    ///
    /// Fails with `RemoteOperationError` if the daemon answered with a
    /// non-empty `error` field. All other failures keep the kind assigned
    /// by the transport or the codec.
    pub async fn call<S: AsRef<str>>(
        &self,
        operation: &str,
        args: &[S],
    ) -> Result<Response, DojutsuError> {
        self.call_with_cancel(operation, args, &CancellationToken::new())
            .await
    }

    /// Like [`call`](Self::call), aborting with `Cancelled` once `cancel` fires
    pub async fn call_with_cancel<S: AsRef<str>>(
        &self,
        operation: &str,
        args: &[S],
        cancel: &CancellationToken,
    ) -> Result<Response, DojutsuError> {
        let request = Request::new(
            self.package.as_str(),
            operation,
            args.iter().map(|a| a.as_ref().to_string()),
        )?;

        let mut codec = EnvelopeCodec::new();
        let mut payload = BytesMut::new();
        codec.encode(&request, &mut payload)?;

        tracing::debug!(
            operation = request.function(),
            args = request.args().len(),
            endpoint = %self.socket_path.display(),
            "Calling daemon"
        );

        let started = Instant::now();
        let mut session = TransportSession::new(&self.socket_path)
            .with_connect_timeout(self.connect_timeout);
        let mut received = session.round_trip(&payload, self.timeout, cancel).await?;

        let response = codec.decode_eof(&mut received)?.ok_or_else(|| {
            DojutsuError::MalformedResponse("empty response from daemon".to_string())
        })?;

        tracing::debug!(
            operation = request.function(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            failed = response.is_error(),
            "Daemon responded"
        );

        response
            .into_result()
            .map_err(DojutsuError::RemoteOperationError)
    }

    /// Invoke a typed operation
    pub async fn invoke(&self, operation: &Operation) -> Result<OperationOutput, DojutsuError> {
        self.invoke_with_cancel(operation, &CancellationToken::new())
            .await
    }

    /// Invoke a typed operation, aborting once `cancel` fires
    pub async fn invoke_with_cancel(
        &self,
        operation: &Operation,
        cancel: &CancellationToken,
    ) -> Result<OperationOutput, DojutsuError> {
        let response = self
            .call_with_cancel(operation.name(), operation.args().as_slice(), cancel)
            .await?;
        operation.interpret(response)
    }

    /// Run the full pipeline on a task
    pub async fn run(
        &self,
        task: &str,
        api_key: &str,
        provider: Provider,
        model: Option<&str>,
    ) -> Result<RunResult, DojutsuError> {
        let op = Operation::Run {
            task: task.to_string(),
            api_key: api_key.to_string(),
            provider,
            model: model.map(String::from),
            verbose: false,
        };
        match self.invoke(&op).await? {
            OperationOutput::Run(result) => Ok(result),
            other => Err(unexpected_output("run", &other)),
        }
    }

    /// Run the structural analysis step only
    pub async fn byakugan(
        &self,
        task: &str,
        api_key: &str,
        provider: Provider,
        model: Option<&str>,
    ) -> Result<ByakuganResult, DojutsuError> {
        let op = Operation::Byakugan {
            task: task.to_string(),
            api_key: api_key.to_string(),
            provider,
            model: model.map(String::from),
        };
        match self.invoke(&op).await? {
            OperationOutput::Byakugan(result) => Ok(result),
            other => Err(unexpected_output("byakugan", &other)),
        }
    }

    /// Number of skills the daemon has indexed
    pub async fn skills_count(&self) -> Result<u64, DojutsuError> {
        match self.invoke(&Operation::SkillsCount).await? {
            OperationOutput::SkillsCount(count) => Ok(count),
            other => Err(unexpected_output("skills_count", &other)),
        }
    }

    /// Listing of indexed skills, as returned by the daemon
    pub async fn skills_list(&self) -> Result<Response, DojutsuError> {
        match self.invoke(&Operation::SkillsList).await? {
            OperationOutput::SkillsList(response) => Ok(response),
            other => Err(unexpected_output("skills_list", &other)),
        }
    }

    /// Scan a skill document for malicious patterns
    pub async fn check_skill(&self, content: &str) -> Result<SkillCheck, DojutsuError> {
        let op = Operation::CheckSkill {
            content: content.to_string(),
        };
        match self.invoke(&op).await? {
            OperationOutput::CheckSkill(check) => Ok(check),
            other => Err(unexpected_output("check_skill", &other)),
        }
    }

    /// Daemon version information
    pub async fn version(&self) -> Result<VersionInfo, DojutsuError> {
        match self.invoke(&Operation::Version).await? {
            OperationOutput::Version(info) => Ok(info),
            other => Err(unexpected_output("version", &other)),
        }
    }
}

impl Default for DojutsuClient {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected_output(expected: &str, got: &OperationOutput) -> DojutsuError {
    DojutsuError::InvalidRequest(format!(
        "expected a `{}` operation, got output {:?}",
        expected, got
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojutsu_core::ErrorKind;

    #[test]
    fn test_defaults() {
        let client = DojutsuClient::new();
        assert_eq!(client.socket_path(), Path::new("/tmp/allpath_runner.sock"));
        assert_eq!(client.package(), "dojutsu-agent");
        assert_eq!(client.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            socket_path: PathBuf::from("/run/dojutsu.sock"),
            package: "senjutsu-agent".to_string(),
            timeout: Duration::from_secs(10),
            provider: Provider::Anthropic,
            ..Default::default()
        };
        let client = DojutsuClient::from_config(&config);
        assert_eq!(client.socket_path(), Path::new("/run/dojutsu.sock"));
        assert_eq!(client.package(), "senjutsu-agent");
        assert_eq!(client.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_empty_operation_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        // Socket path does not exist: a connect attempt would yield EndpointNotFound
        let client = DojutsuClient::with_socket_path(dir.path().join("daemon.sock"));

        let err = client.call::<&str>("", &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = client.call("skills_count", &[] as &[&str]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }
}
