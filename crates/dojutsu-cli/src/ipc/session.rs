//! Transport session: one Unix socket connection for one round trip
//!
//! The request is framed by the connection itself: after the payload is
//! written the write half is shut down, and the response is complete when
//! the daemon closes its side. A session is single-use and always releases
//! its socket before `round_trip` returns.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use dojutsu_core::endpoint::DEFAULT_CONNECT_TIMEOUT;
use dojutsu_core::DojutsuError;

/// Read buffer growth step
const READ_CHUNK: usize = 8 * 1024;

/// Pause between connect attempts while the daemon's accept queue is full
const BACKLOG_RETRY: Duration = Duration::from_millis(10);

/// Lifecycle of a transport session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet used
    Idle,
    /// Connect in progress
    Connecting,
    /// Socket open, nothing written
    Connected,
    /// Request written and write half shut down
    WriteComplete,
    /// Draining the response stream
    Reading,
    /// Daemon signalled end-of-stream
    Drained,
    /// Socket released after a successful round trip
    Closed,
    /// Socket released after a failure
    Failed,
}

impl SessionState {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed)
    }
}

/// Owns a single connection to the daemon
#[derive(Debug)]
pub struct TransportSession {
    endpoint: PathBuf,
    connect_timeout: Duration,
    stream: Option<UnixStream>,
    state: SessionState,
}

impl TransportSession {
    /// Create an idle session for the socket at `endpoint`
    pub fn new(endpoint: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stream: None,
            state: SessionState::Idle,
        }
    }

    /// Bound the connect phase separately from the whole round trip
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Socket path
    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session still holds a socket
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Run one full exchange: connect, write, half-close, drain, close
    ///
    /// Returns the raw response bytes. Fails with `TimeoutExceeded` if the
    /// exchange has not finished within `timeout`, or `Cancelled` if
    /// `cancel` fires first. The socket is closed on every path.
    pub async fn round_trip(
        &mut self,
        payload: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<BytesMut, DojutsuError> {
        if self.state != SessionState::Idle {
            return Err(DojutsuError::InvalidRequest(format!(
                "transport session is single-use (state: {:?})",
                self.state
            )));
        }

        let started = Instant::now();
        // A limit too large to add to `started` never fires
        let deadline = started.checked_add(timeout);

        let bounded = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, self.exchange(payload))
                    .await
                    .unwrap_or_else(|_| {
                        Err(DojutsuError::TimeoutExceeded {
                            elapsed: started.elapsed(),
                            limit: timeout,
                        })
                    }),
                None => self.exchange(payload).await,
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DojutsuError::Cancelled),
            result = bounded => result,
        };

        match outcome {
            Ok(buf) => {
                self.close();
                tracing::debug!(
                    endpoint = %self.endpoint.display(),
                    bytes = buf.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Round trip complete"
                );
                Ok(buf)
            }
            Err(e) => {
                self.abort(&e);
                Err(e)
            }
        }
    }

    async fn exchange(&mut self, payload: &[u8]) -> Result<BytesMut, DojutsuError> {
        self.connect().await?;
        self.send(payload).await?;
        self.drain().await
    }

    async fn connect(&mut self) -> Result<(), DojutsuError> {
        self.state = SessionState::Connecting;
        tracing::debug!(endpoint = %self.endpoint.display(), "Connecting to daemon");

        let started = Instant::now();
        let connect = dial(&self.endpoint);
        let stream = match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(DojutsuError::connect_failed(&self.endpoint, e)),
            Err(_) => {
                return Err(DojutsuError::TimeoutExceeded {
                    elapsed: started.elapsed(),
                    limit: self.connect_timeout,
                })
            }
        };

        self.stream = Some(stream);
        self.state = SessionState::Connected;
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), DojutsuError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| DojutsuError::WriteError(io::ErrorKind::NotConnected.into()))?;

        stream
            .write_all(payload)
            .await
            .map_err(DojutsuError::WriteError)?;
        // Shutting down the write half is the end-of-request marker
        stream.shutdown().await.map_err(DojutsuError::WriteError)?;

        self.state = SessionState::WriteComplete;
        tracing::trace!(bytes = payload.len(), "Request written, write half closed");
        Ok(())
    }

    async fn drain(&mut self) -> Result<BytesMut, DojutsuError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| DojutsuError::ReadError(io::ErrorKind::NotConnected.into()))?;
        self.state = SessionState::Reading;

        let mut buf = BytesMut::with_capacity(READ_CHUNK);
        loop {
            buf.reserve(READ_CHUNK);
            let n = stream
                .read_buf(&mut buf)
                .await
                .map_err(DojutsuError::ReadError)?;
            if n == 0 {
                break;
            }
            tracing::trace!(bytes = n, total = buf.len(), "Read response chunk");
        }

        self.state = SessionState::Drained;
        Ok(buf)
    }

    fn close(&mut self) {
        self.stream = None;
        self.state = SessionState::Closed;
    }

    fn abort(&mut self, err: &DojutsuError) {
        let at = self.state;
        self.stream = None;
        self.state = SessionState::Failed;
        tracing::debug!(
            endpoint = %self.endpoint.display(),
            state = ?at,
            error = %err,
            "Round trip failed, connection closed"
        );
    }
}

/// Connect to `endpoint`, waiting while the listener's backlog is full
///
/// A non-blocking connect to a Unix listener with a full accept queue
/// fails with `WouldBlock` instead of pending. That is a busy daemon, not
/// an absent one, so it is bounded by the connect timeout of the caller.
async fn dial(endpoint: &Path) -> io::Result<UnixStream> {
    loop {
        match UnixStream::connect(endpoint).await {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                tracing::trace!(endpoint = %endpoint.display(), "Daemon backlog full, waiting");
                tokio::time::sleep(BACKLOG_RETRY).await;
            }
            result => return result,
        }
    }
}
