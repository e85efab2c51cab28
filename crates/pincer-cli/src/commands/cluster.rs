//! Cluster commands: listing and rolling restart.

use std::io::Write;
use std::time::Duration;

use pincer_client::{ClientConfig, RpcClient};
use tokio::time::sleep;
use tracing::debug;

use crate::cli::ClusterCommands;
use crate::commands::{ensure_ok, job_is_terminal};
use crate::error::CliError;
use crate::output::{ClusterListView, OutputFormat, TableDisplay};

/// How often a `--wait` rolling restart polls the job.
const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Executes `pincer cluster ...`.
#[derive(Debug)]
pub struct ClusterCommand {
    config: ClientConfig,
}

impl ClusterCommand {
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
        command: &ClusterCommands,
    ) -> Result<(), CliError> {
        match command {
            ClusterCommands::List => self.list(writer, format).await,
            ClusterCommands::RollingRestart { cluster_id, wait } => {
                self.rolling_restart(writer, format, *cluster_id, *wait).await
            }
        }
    }

    async fn list<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let mut client = RpcClient::new(self.config.clone());
        client.get_clusters().await?;

        let reply = client.reply().clone();
        if !ensure_ok(writer, format, &reply)? {
            return Ok(());
        }

        if format.is_json() {
            return format.write_json(writer, &reply);
        }

        ClusterListView {
            clusters: reply.clusters(),
        }
        .write_table(writer)
    }

    async fn rolling_restart<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        cluster_id: i64,
        wait: bool,
    ) -> Result<(), CliError> {
        let mut client = RpcClient::new(self.config.clone());
        client.rolling_restart(cluster_id).await?;

        let reply = client.reply().clone();
        if !ensure_ok(writer, format, &reply)? {
            return Ok(());
        }

        let job_id = reply.job().get("job_id").map_or(0, |v| v.to_int(0));
        writeln!(writer, "Job {job_id} started.")?;

        if !wait {
            return Ok(());
        }

        // The controller runs the restart asynchronously; progress is
        // observed with independent request/reply cycles.
        let mut last_status = String::new();
        loop {
            sleep(WAIT_POLL_INTERVAL).await;

            client.get_job_instance(cluster_id, job_id).await?;
            let reply = client.reply().clone();
            if !ensure_ok(writer, format, &reply)? {
                return Ok(());
            }

            let job = reply.job();
            let status = job.get("status").map_or_else(String::new, |v| v.to_string());
            debug!(job_id, status = %status, "polled job");

            if status != last_status {
                let text = job
                    .get("status_text")
                    .map_or_else(String::new, |v| v.to_string());
                writeln!(writer, "Job {job_id}: {status} {text}")?;
                writer.flush()?;
                last_status = status.clone();
            }

            if job_is_terminal(&status) {
                if status == "FINISHED" {
                    return Ok(());
                }
                return Err(CliError::Controller(format!(
                    "job {job_id} ended with status {status}"
                )));
            }
        }
    }
}
