//! CLI error types.

use std::fmt;

use pincer_client::ClientError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Transport failure while talking to the controller.
    Client(ClientError),
    /// The controller processed the request but marked it failed.
    Controller(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(e) => write!(f, "{e}"),
            Self::Controller(msg) => write!(f, "controller error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Controller(_) => None,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_client_error_category() {
        let err = CliError::from(ClientError::Connect("refused".into()));
        assert_eq!(err.to_string(), "connect failed: refused");
    }

    #[test]
    fn display_controller_error() {
        let err = CliError::Controller("access denied".into());
        assert_eq!(err.to_string(), "controller error: access denied");
    }
}
