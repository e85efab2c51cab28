//! Error types for the pincer-proto crate.

use thiserror::Error;

/// Errors that can occur while bridging wire documents into the value model.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The record body was not decodable as JSON.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The document decoded, but its top-level type was not the expected one.
    #[error("unexpected document type: expected {0}")]
    UnexpectedType(&'static str),
}
