//! Transport error taxonomy.

use thiserror::Error;

/// Errors reported by the connection manager and the RPC client.
///
/// All of these are recoverable at the caller's discretion (retry the whole
/// request); the transport itself never retries beyond the interrupted-call
/// loop in the read/write primitives.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Controller host or port is not set or not usable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Host name did not resolve.
    #[error("name resolution failed: {0}")]
    Resolution(String),

    /// Socket connect or TLS handshake failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Write or read failed after the retry budget was exhausted.
    #[error("i/o error: {0}")]
    Io(String),

    /// The peer sent something that is not a usable reply.
    #[error("protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        assert_eq!(
            ClientError::Config("controller host name is not set".into()).to_string(),
            "configuration error: controller host name is not set"
        );
        assert_eq!(
            ClientError::Io("read timed out".into()).to_string(),
            "i/o error: read timed out"
        );
    }
}
