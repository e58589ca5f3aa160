use crate::config::ServerConfig;
use crate::constants::{DEFAULT_DATA_TIMEOUT_SECS, DEFAULT_TRANSFER_BUFFER_SIZE};
use crate::core_transfer::error::TransferError;
use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one data transfer. Variants are ordered; a transfer only
/// ever moves forward and never leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransferState {
    Pending,
    Connecting,
    Transferring,
    Completed,
    Aborted,
    Error,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransferState::Completed | TransferState::Aborted | TransferState::Error
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Send,
    Receive,
}

#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub buffer_size: usize,
    pub idle_timeout: Option<Duration>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_TRANSFER_BUFFER_SIZE,
            idle_timeout: Some(Duration::from_secs(DEFAULT_DATA_TIMEOUT_SECS)),
        }
    }
}

impl TransferOptions {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            buffer_size: server.transfer_buffer_size.max(512),
            idle_timeout: server.data_timeout(),
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<TransferState>,
    cancel: CancellationToken,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(TransferState::Pending),
            cancel: CancellationToken::new(),
        }
    }

    fn state(&self) -> TransferState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moves to `next` unless that would go backwards or leave a terminal
    /// state. Returns whether the transition happened.
    fn advance(&self, next: TransferState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_terminal() || next <= *state {
            return false;
        }
        *state = next;
        true
    }
}

/// Cloneable control side of a [`Transfer`], used to observe and abort it
/// while `run` is suspended on another task.
#[derive(Debug, Clone)]
pub struct TransferHandle {
    shared: Arc<Shared>,
}

impl TransferHandle {
    pub fn state(&self) -> TransferState {
        self.shared.state()
    }

    /// Aborts the transfer. Idempotent; a transfer that already reached a
    /// terminal state keeps it.
    pub fn abort(&self) {
        if self.shared.advance(TransferState::Aborted) {
            info!("Transfer aborted");
        }
        self.shared.cancel.cancel();
    }
}

/// Outcome of [`Transfer::run`].
#[derive(Debug)]
pub struct TransferReport {
    pub state: TransferState,
    pub bytes: u64,
    /// Set only when `state` is [`TransferState::Error`].
    pub error: Option<TransferError>,
}

/// One copy between a local stream and a freshly opened data connection.
/// Exactly one of `source`/`sink` is the data connection.
pub struct Transfer {
    direction: Direction,
    peer: SocketAddr,
    source: Box<dyn AsyncRead + Send + Unpin>,
    sink: Box<dyn AsyncWrite + Send + Unpin>,
    shared: Arc<Shared>,
    options: TransferOptions,
}

async fn connect(
    endpoint: SocketAddr,
    options: &TransferOptions,
    shared: &Shared,
) -> Result<TcpStream, TransferError> {
    shared.advance(TransferState::Connecting);
    debug!("Opening data connection to {}", endpoint);

    let attempt = TcpStream::connect(endpoint);
    let result = match options.idle_timeout {
        Some(limit) => tokio::time::timeout(limit, attempt)
            .await
            .map_err(|_| TransferError::ConnectTimedOut(endpoint))?,
        None => attempt.await,
    };

    match result {
        Ok(stream) => {
            info!("Data connection established with {}", endpoint);
            Ok(stream)
        }
        Err(e) => {
            error!("Failed to connect to client {}: {}", endpoint, e);
            Err(TransferError::Connect(endpoint, e))
        }
    }
}

async fn within<T>(
    limit: Option<Duration>,
    op: impl Future<Output = std::io::Result<T>>,
) -> Result<T, TransferError> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, op).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TransferError::TimedOut(limit)),
        },
        None => Ok(op.await?),
    }
}

async fn copy(
    source: &mut (dyn AsyncRead + Send + Unpin),
    sink: &mut (dyn AsyncWrite + Send + Unpin),
    options: &TransferOptions,
    bytes: &mut u64,
) -> Result<(), TransferError> {
    let mut buffer = vec![0; options.buffer_size];
    loop {
        let n = within(options.idle_timeout, source.read(&mut buffer)).await?;
        if n == 0 {
            break;
        }
        within(options.idle_timeout, sink.write_all(&buffer[..n])).await?;
        *bytes += n as u64;
    }
    within(options.idle_timeout, sink.flush()).await?;
    within(options.idle_timeout, sink.shutdown()).await?;
    Ok(())
}

impl Transfer {
    /// Opens a data connection to `endpoint` that will receive `source`.
    pub async fn create_outbound_send<R>(
        endpoint: SocketAddr,
        source: R,
        options: TransferOptions,
    ) -> Result<Transfer, TransferError>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let shared = Arc::new(Shared::new());
        let connection = connect(endpoint, &options, &shared).await?;
        Ok(Transfer {
            direction: Direction::Send,
            peer: endpoint,
            source: Box::new(source),
            sink: Box::new(connection),
            shared,
            options,
        })
    }

    /// Opens a data connection to `endpoint` whose bytes are written to `sink`.
    pub async fn create_outbound_receive<W>(
        endpoint: SocketAddr,
        sink: W,
        options: TransferOptions,
    ) -> Result<Transfer, TransferError>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let shared = Arc::new(Shared::new());
        let connection = connect(endpoint, &options, &shared).await?;
        Ok(Transfer {
            direction: Direction::Receive,
            peer: endpoint,
            source: Box::new(connection),
            sink: Box::new(sink),
            shared,
            options,
        })
    }

    pub fn handle(&self) -> TransferHandle {
        TransferHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> TransferState {
        self.shared.state()
    }

    /// Copies source to sink until end of stream, an error, or an abort.
    /// Both streams are closed when this returns, whatever the outcome.
    pub async fn run(self) -> TransferReport {
        let Transfer {
            direction,
            peer,
            mut source,
            mut sink,
            shared,
            options,
        } = self;

        let mut bytes = 0u64;
        let mut failure = None;

        if shared.advance(TransferState::Transferring) {
            debug!("Transfer ({:?}) with {} started", direction, peer);
            let outcome = tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => None,
                result = copy(source.as_mut(), sink.as_mut(), &options, &mut bytes) => Some(result),
            };

            match outcome {
                Some(Ok(())) => {
                    shared.advance(TransferState::Completed);
                }
                Some(Err(e)) => {
                    if shared.advance(TransferState::Error) {
                        warn!("Transfer ({:?}) with {} failed: {}", direction, peer, e);
                        failure = Some(e);
                    }
                }
                None => {
                    shared.advance(TransferState::Aborted);
                }
            }
        }

        drop(source);
        drop(sink);

        let state = shared.state();
        info!(
            "Transfer ({:?}) with {} finished: {:?}, {} bytes",
            direction, peer, state, bytes
        );
        TransferReport {
            state,
            bytes,
            error: failure,
        }
    }
}
