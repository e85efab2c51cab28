//! Client configuration.
//!
//! An explicit value threaded into the connection and the RPC client at
//! construction time; nothing here is process-global.

use std::time::Duration;

/// Default controller port.
pub const DEFAULT_PORT: u16 = 9555;

/// Read and write timeout. Prevents an indefinite hang on a half-open peer.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(240);

/// Timeout for establishing the TCP connection and the TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for one controller.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Controller host name or address.
    pub host: String,
    /// Controller port.
    pub port: u16,
    /// Wrap the connection in TLS after connecting.
    pub use_tls: bool,
    /// RPC token injected into every request payload, when set.
    pub token: Option<String>,
    /// Timeout applied to connect and TLS handshake.
    pub connect_timeout: Duration,
    /// Timeout applied to every read and write.
    pub io_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for the given controller endpoint, with default
    /// timeouts, no TLS and no token.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls: false,
            token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Enables or disables TLS.
    #[must_use]
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Sets the RPC token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = ClientConfig::new("cmon.example.com", 9501)
            .with_tls(true)
            .with_token("secret");

        assert_eq!(config.host, "cmon.example.com");
        assert_eq!(config.port, 9501);
        assert!(config.use_tls);
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.io_timeout, DEFAULT_IO_TIMEOUT);
    }
}
