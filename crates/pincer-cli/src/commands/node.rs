//! Node commands.
//!
//! The controller has no separate node query: node information arrives
//! with the cluster listing, and the reply's typed accessors flatten the
//! hosts of every cluster.

use std::io::Write;

use pincer_client::{ClientConfig, RpcClient};

use crate::cli::NodeCommands;
use crate::commands::ensure_ok;
use crate::error::CliError;
use crate::output::{NodeListView, OutputFormat, TableDisplay};

/// Executes `pincer node ...`.
#[derive(Debug)]
pub struct NodeCommand {
    config: ClientConfig,
}

impl NodeCommand {
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
        command: &NodeCommands,
    ) -> Result<(), CliError> {
        match command {
            NodeCommands::List => self.list(writer, format).await,
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

        NodeListView {
            nodes: reply.nodes(),
        }
        .write_table(writer)
    }
}
