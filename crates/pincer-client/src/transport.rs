//! Connection management: resolution, connect, optional TLS, guarded I/O.
//!
//! A [`Connection`] owns the socket (and the TLS session when one is
//! active), the record buffer fed by reads, and the accumulated session
//! headers. It is the single place that touches the network; everything
//! above it works on complete records.
//!
//! TLS note: the peer certificate is intentionally **not** validated
//! against a trust store, and the host name is not checked. Controllers
//! commonly run with self-signed certificates; the connection gets
//! confidentiality but no authentication of the server identity. This is
//! an operator-facing default, not something to silently harden here.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::framer::RecordBuffer;
use crate::headers::SessionHeaders;

/// Bytes requested from the socket per read call.
const READ_CHUNK: usize = 16 * 1024;

/// Cap on interrupted-read retries; avoids livelock on a pathological peer.
const MAX_READ_RETRIES: u32 = 100;

/// Any byte stream the connection can run over.
///
/// Implemented for every `AsyncRead + AsyncWrite` transport, so tests and
/// unusual deployments can attach a pre-established stream instead of
/// having the connection dial TCP itself.
pub trait Wire: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Wire for T {}

/// One physical connection to a controller.
pub struct Connection {
    config: ClientConfig,
    stream: Option<Box<dyn Wire>>,
    session: SessionHeaders,
    buffer: RecordBuffer,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("use_tls", &self.config.use_tls)
            .field("connected", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// A disconnected connection for the given controller.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            stream: None,
            session: SessionHeaders::new(),
            buffer: RecordBuffer::new(),
        }
    }

    /// The configuration this connection was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// True while a stream is attached.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Accumulated session headers.
    #[must_use]
    pub fn session(&self) -> &SessionHeaders {
        &self.session
    }

    /// Mutable access to the session headers, for harvesting.
    pub fn session_mut(&mut self) -> &mut SessionHeaders {
        &mut self.session
    }

    /// The record buffer fed by [`Connection::read_chunk`].
    #[must_use]
    pub fn buffer(&self) -> &RecordBuffer {
        &self.buffer
    }

    /// Mutable access to the record buffer.
    pub fn buffer_mut(&mut self) -> &mut RecordBuffer {
        &mut self.buffer
    }

    /// Attaches an already-established byte stream.
    ///
    /// Session state and buffered bytes from any previous stream are
    /// dropped.
    pub fn attach(&mut self, stream: impl Wire + 'static) {
        self.stream = Some(Box::new(stream));
        self.session.clear();
        self.buffer.reset(&[]);
    }

    /// Resolves the controller, connects, and performs the TLS handshake
    /// when requested.
    ///
    /// An existing connection is closed first. On any failure the socket
    /// (and a partially-created TLS session) is fully closed before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// [`ClientError::Config`] when host or port is unset,
    /// [`ClientError::Resolution`] when the host does not resolve, and
    /// [`ClientError::Connect`] for socket and handshake failures.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if self.stream.is_some() {
            self.close().await;
        }

        if self.config.host.is_empty() {
            return Err(ClientError::Config(
                "controller host name is not set".into(),
            ));
        }

        if self.config.port == 0 {
            return Err(ClientError::Config("controller port is not set".into()));
        }

        let host = self.config.host.clone();
        let port = self.config.port;
        debug!(host = %host, port, tls = self.config.use_tls, "connecting to controller");

        let address = lookup_host((host.as_str(), port))
            .await
            .map_err(|e| ClientError::Resolution(format!("host '{host}' not found: {e}")))?
            .next()
            .ok_or_else(|| ClientError::Resolution(format!("host '{host}' not found")))?;

        let tcp = timeout(self.config.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| ClientError::Connect(format!("connect to {host}:{port} timed out")))?
            .map_err(|e| ClientError::Connect(format!("connect to {host}:{port} failed: {e}")))?;

        if self.config.use_tls {
            // SNI is set from the configured host name; verification is
            // disabled (see the module docs). The TCP stream is dropped,
            // and with it closed, when the handshake fails.
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| ClientError::Connect(format!("TLS setup failed: {e}")))?;
            let connector = tokio_native_tls::TlsConnector::from(connector);

            let tls = timeout(self.config.connect_timeout, connector.connect(&host, tcp))
                .await
                .map_err(|_| ClientError::Connect("TLS handshake timed out".into()))?
                .map_err(|e| ClientError::Connect(format!("TLS handshake failed: {e}")))?;

            debug!("TLS handshake finished");
            self.stream = Some(Box::new(tls));
        } else {
            self.stream = Some(Box::new(tcp));
        }

        debug!("connected");
        Ok(())
    }

    /// Shuts the stream down and drops all session state.
    ///
    /// Safe to call when not connected, and idempotent. A TLS session sends
    /// its close-notify as part of the shutdown.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            // Best effort; the peer may already be gone.
            let _ = stream.shutdown().await;
            debug!("connection closed");
        }

        self.session.clear();
        self.buffer.reset(&[]);
    }

    /// Writes all bytes, retrying interrupted calls, within the configured
    /// I/O timeout.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] when not connected, on timeout, or when the
    /// stream fails mid-write.
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), ClientError> {
        let io_timeout = self.config.io_timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ClientError::Io("not connected".into()))?;

        let write = async {
            let mut written = 0;
            while written < bytes.len() {
                match stream.write(&bytes[written..]).await {
                    Ok(0) => return Err(ClientError::Io("connection closed mid-write".into())),
                    Ok(n) => written += n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => return Err(ClientError::Io(e.to_string())),
                }
            }
            Ok(())
        };

        timeout(io_timeout, write)
            .await
            .map_err(|_| ClientError::Io("write timed out".into()))?
    }

    /// Reads one chunk from the stream into the record buffer.
    ///
    /// Returns the number of bytes appended; 0 means the peer closed the
    /// stream. Interrupted calls are retried up to a bounded budget.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] when not connected, on timeout, when the retry
    /// budget is exhausted, or on a stream error.
    pub async fn read_chunk(&mut self) -> Result<usize, ClientError> {
        let io_timeout = self.config.io_timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ClientError::Io("not connected".into()))?;

        let mut chunk = [0u8; READ_CHUNK];
        let mut retries = 0u32;

        loop {
            match timeout(io_timeout, stream.read(&mut chunk)).await {
                Err(_) => return Err(ClientError::Io("read timed out".into())),
                Ok(Ok(n)) => {
                    trace!(bytes = n, "read chunk");
                    self.buffer.append(&chunk[..n]);
                    return Ok(n);
                }
                Ok(Err(e)) if e.kind() == ErrorKind::Interrupted => {
                    retries += 1;
                    if retries > MAX_READ_RETRIES {
                        return Err(ClientError::Io(
                            "read retry budget exhausted (interrupted)".into(),
                        ));
                    }
                }
                Ok(Err(e)) => return Err(ClientError::Io(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_missing_host() {
        let mut connection = Connection::new(ClientConfig::new("", 9555));
        let err = connection.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(!connection.is_connected());
    }

    #[tokio::test]
    async fn connect_rejects_missing_port() {
        let mut connection = Connection::new(ClientConfig::new("cmon.example.com", 0));
        let err = connection.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn close_is_idempotent_and_safe_when_never_connected() {
        let mut connection = Connection::new(ClientConfig::new("cmon.example.com", 9555));
        connection.close().await;
        connection.close().await;
        assert!(!connection.is_connected());
    }

    #[tokio::test]
    async fn close_clears_session_state() {
        let (local, _remote) = tokio::io::duplex(256);
        let mut connection = Connection::new(ClientConfig::new("stub", 1));
        connection.attach(local);
        connection
            .session_mut()
            .harvest(b"Set-Cookie: sid=abc123\r\n");
        assert!(!connection.session().is_empty());

        connection.close().await;
        assert!(!connection.is_connected());
        assert!(connection.session().is_empty());
    }

    #[tokio::test]
    async fn reconnect_to_unreachable_host_reports_connect_error() {
        let mut config = ClientConfig::new("127.0.0.1", 9);
        config.connect_timeout = std::time::Duration::from_millis(500);
        let mut connection = Connection::new(config);

        let (local, _remote) = tokio::io::duplex(64);
        connection.attach(local);
        connection.close().await;

        let err = connection.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
        assert!(!connection.is_connected());

        // Nothing left open; a second close is a no-op.
        connection.close().await;
    }

    #[tokio::test]
    async fn io_on_a_disconnected_connection_fails() {
        let mut connection = Connection::new(ClientConfig::new("cmon.example.com", 9555));
        assert!(matches!(
            connection.write_all(b"x").await,
            Err(ClientError::Io(_))
        ));
        assert!(matches!(
            connection.read_chunk().await,
            Err(ClientError::Io(_))
        ));
    }

    #[tokio::test]
    async fn read_chunk_reports_eof_as_zero() {
        let (local, remote) = tokio::io::duplex(256);
        let mut connection = Connection::new(ClientConfig::new("stub", 1));
        connection.attach(local);
        drop(remote);

        assert_eq!(connection.read_chunk().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn write_and_read_pass_bytes_through() {
        let (local, mut remote) = tokio::io::duplex(256);
        let mut connection = Connection::new(ClientConfig::new("stub", 1));
        connection.attach(local);

        connection.write_all(b"ping").await.unwrap();
        let mut received = [0u8; 4];
        remote.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"ping");

        remote.write_all(b"pong\n\n").await.unwrap();
        let n = connection.read_chunk().await.unwrap();
        assert_eq!(n, 6);
        assert!(connection.buffer().has_complete_record());
        assert_eq!(connection.buffer().extract_record(), b"pong");
    }
}
