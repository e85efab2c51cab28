//! Job commands: listing and log tailing.

use std::io::Write;
use std::time::Duration;

use pincer_client::{ClientConfig, RpcClient};
use tokio::time::sleep;
use tracing::debug;

use crate::cli::JobCommands;
use crate::commands::{ensure_ok, job_is_terminal};
use crate::error::CliError;
use crate::output::{JobListView, JobMessagesView, OutputFormat, TableDisplay};

/// Executes `pincer job ...`.
#[derive(Debug)]
pub struct JobCommand {
    config: ClientConfig,
}

impl JobCommand {
    /// A command bound to the given controller.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Runs the subcommand.
    ///
    /// # Errors
    ///
    /// Transport failures and not-OK replies.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &JobCommands,
    ) -> Result<(), CliError> {
        match command {
            JobCommands::List { cluster_id } => self.list(writer, format, *cluster_id).await,
            JobCommands::Log {
                cluster_id,
                job_id,
                follow,
                ..
            } => {
                self.log(
                    writer,
                    format,
                    *cluster_id,
                    *job_id,
                    *follow,
                    command.poll_duration(),
                )
                .await
            }
        }
    }

    async fn list<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        cluster_id: i64,
    ) -> Result<(), CliError> {
        let mut client = RpcClient::new(self.config.clone());
        client.get_job_instances(cluster_id).await?;

        let reply = client.reply().clone();
        if !ensure_ok(writer, format, &reply)? {
            return Ok(());
        }

        if format.is_json() {
            return format.write_json(writer, &reply);
        }

        JobListView {
            jobs: reply.jobs(),
        }
        .write_table(writer)
    }

    /// Prints the job log; in follow mode, keeps polling with independent
    /// request/reply cycles and prints only the messages that are new
    /// since the previous poll, until the job reaches a terminal state.
    async fn log<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        cluster_id: i64,
        job_id: i64,
        follow: bool,
        poll_interval: Duration,
    ) -> Result<(), CliError> {
        let mut client = RpcClient::new(self.config.clone());
        let mut printed = 0usize;

        loop {
            client.get_job_log(cluster_id, job_id).await?;

            let reply = client.reply().clone();
            if !ensure_ok(writer, format, &reply)? {
                return Ok(());
            }

            // JSON output is a one-shot dump; follow mode always prints
            // message lines.
            if format.is_json() && !follow {
                return format.write_json(writer, &reply);
            }

            let messages = reply.job_messages();
            if messages.len() > printed {
                JobMessagesView {
                    messages: messages[printed..].to_vec(),
                }
                .write_table(writer)?;
                writer.flush()?;
                printed = messages.len();
            }

            if !follow {
                return Ok(());
            }

            client.get_job_instance(cluster_id, job_id).await?;
            let status = client
                .reply()
                .job()
                .get("status")
                .map_or_else(String::new, |v| v.to_string());
            debug!(job_id, status = %status, printed, "polled job log");

            if job_is_terminal(&status) {
                writeln!(writer, "Job {job_id} ended with status {status}.")?;
                return Ok(());
            }

            sleep(poll_interval).await;
        }
    }
}
