//! # pincer-cli
//!
//! Command-line interface for Pincer cluster controllers.
//!
//! Provides commands for:
//! - Cluster listing and rolling restarts
//! - Node listing
//! - Job listing and job log tailing
//! - Controller liveness checks
//!
//! # Architecture
//!
//! The CLI talks to a controller over the private RPC protocol implemented
//! in `pincer-client`: an HTTP-like POST with a JSON payload per
//! operation, session-cookie authentication, and blank-line/0x1E record
//! framing on the reply stream.
//!
//! ```text
//! ┌────────────┐      RPC protocol       ┌──────────────┐
//! │   pincer   │◄───────────────────────►│  controller  │
//! └────────────┘   (TCP, optional TLS)   └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, ClusterCommands, Commands, Format, JobCommands, NodeCommands};
pub use error::CliError;
pub use output::OutputFormat;
