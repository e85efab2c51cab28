//! Command implementations.

mod cluster;
mod job;
mod node;
mod ping;

use std::io::Write;

use pincer_client::RpcReply;

pub use cluster::ClusterCommand;
pub use job::JobCommand;
pub use node::NodeCommand;
pub use ping::PingCommand;

use crate::error::CliError;
use crate::output::OutputFormat;

/// Job states after which no further progress happens.
pub(crate) fn job_is_terminal(status: &str) -> bool {
    matches!(status, "FINISHED" | "FAILED" | "ABORTED")
}

/// Checks a decoded reply before rendering it.
///
/// A not-OK reply in JSON mode is still printed (scripts want to see the
/// controller's own error document) and reported as handled; in table mode
/// it becomes a [`CliError::Controller`].
pub(crate) fn ensure_ok<W: Write>(
    writer: &mut W,
    format: &OutputFormat,
    reply: &RpcReply,
) -> Result<bool, CliError> {
    if reply.is_ok() {
        return Ok(true);
    }

    if format.is_json() {
        format.write_json(writer, reply)?;
        return Ok(false);
    }

    let message = if reply.error_string().is_empty() {
        format!("request failed with status '{}'", reply.request_status())
    } else {
        reply.error_string()
    };

    Err(CliError::Controller(message))
}
