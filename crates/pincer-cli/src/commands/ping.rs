//! Controller liveness check.

use std::io::Write;
use std::time::Instant;

use pincer_client::{ClientConfig, RpcClient};

use crate::commands::ensure_ok;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Executes `pincer ping`.
#[derive(Debug)]
pub struct PingCommand {
    config: ClientConfig,
}

impl PingCommand {
    /// A command bound to the given controller.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Pings the controller and reports the round-trip time.
    ///
    /// # Errors
    ///
    /// Transport failures and not-OK replies.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let mut client = RpcClient::new(self.config.clone());

        let start = Instant::now();
        client.ping().await?;
        let elapsed = start.elapsed();

        let reply = client.reply().clone();
        if !ensure_ok(writer, format, &reply)? {
            return Ok(());
        }

        if format.is_json() {
            return format.write_json(writer, &reply);
        }

        let server = client.server_version().await;
        if server.is_empty() {
            writeln!(writer, "Controller answered in {} ms.", elapsed.as_millis())?;
        } else {
            writeln!(
                writer,
                "Controller answered in {} ms (server: {server}).",
                elapsed.as_millis()
            )?;
        }

        Ok(())
    }
}
