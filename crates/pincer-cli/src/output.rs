//! Output formatting for CLI commands.
//!
//! Table output is built from the typed objects of `pincer-proto`; JSON
//! output prints the raw reply so scripts see exactly what the controller
//! sent.

use std::io::Write;

use chrono::DateTime;
use pincer_client::RpcReply;
use pincer_proto::{Cluster, Node, VariantList};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write the raw reply as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_json<W: Write>(&self, writer: &mut W, reply: &RpcReply) -> Result<(), CliError> {
        writeln!(writer, "{}", reply.to_json_string())?;
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Cluster listing.
#[derive(Debug)]
pub struct ClusterListView {
    /// Clusters to render.
    pub clusters: Vec<Cluster>,
}

impl TableDisplay for ClusterListView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let name_width = column_width("NAME", self.clusters.iter().map(Cluster::name));
        let type_width = column_width("TYPE", self.clusters.iter().map(Cluster::cluster_type));
        let owner_width = column_width("OWNER", self.clusters.iter().map(Cluster::owner_name));

        writeln!(
            writer,
            "{:>5}  {:<10}  {:<type_width$}  {:<owner_width$}  {:<name_width$}  STATUS",
            "ID", "STATE", "TYPE", "OWNER", "NAME",
        )?;

        for cluster in &self.clusters {
            writeln!(
                writer,
                "{:>5}  {:<10}  {:<type_width$}  {:<owner_width$}  {:<name_width$}  {}",
                cluster.cluster_id(),
                cluster.state(),
                cluster.cluster_type(),
                cluster.owner_name(),
                cluster.name(),
                cluster.status_text(),
            )?;
        }

        writeln!(writer, "Total: {} cluster(s)", self.clusters.len())?;
        Ok(())
    }
}

/// Node listing across all clusters.
#[derive(Debug)]
pub struct NodeListView {
    /// Nodes to render.
    pub nodes: Vec<Node>,
}

impl TableDisplay for NodeListView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let host_width = column_width("HOST", self.nodes.iter().map(Node::host_name));
        let role_width = column_width("ROLE", self.nodes.iter().map(Node::role));
        let version_width = column_width("VERSION", self.nodes.iter().map(Node::version));

        writeln!(
            writer,
            "{:<host_width$}  {:>5}  {:<role_width$}  {:<version_width$}  STATUS",
            "HOST", "PORT", "ROLE", "VERSION",
        )?;

        for node in &self.nodes {
            let port = if node.has_port() {
                node.port().to_string()
            } else {
                "-".to_string()
            };

            writeln!(
                writer,
                "{:<host_width$}  {:>5}  {:<role_width$}  {:<version_width$}  {}",
                node.host_name(),
                port,
                node.role(),
                node.version(),
                node.host_status(),
            )?;
        }

        writeln!(writer, "Total: {} node(s)", self.nodes.len())?;
        Ok(())
    }
}

/// Job listing for one cluster.
#[derive(Debug)]
pub struct JobListView {
    /// Job instances as received from the controller.
    pub jobs: VariantList,
}

impl TableDisplay for JobListView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "{:>6}  {:<10}  {:<19}  TITLE",
            "ID", "STATUS", "CREATED",
        )?;

        for job in &self.jobs {
            let job = job.to_variant_map();
            let created = job.get("created").map_or_else(String::new, |v| v.to_string());
            let title = job.get("title").map_or_else(String::new, |v| v.to_string());

            writeln!(
                writer,
                "{:>6}  {:<10}  {:<19}  {}",
                job.get("job_id").map_or(0, |v| v.to_int(0)),
                job.get("status").map_or_else(String::new, |v| v.to_string()),
                format_timestamp(&created),
                title,
            )?;
        }

        writeln!(writer, "Total: {} job(s)", self.jobs.len())?;
        Ok(())
    }
}

/// Log messages of one job.
#[derive(Debug)]
pub struct JobMessagesView {
    /// Messages as received from the controller.
    pub messages: VariantList,
}

impl TableDisplay for JobMessagesView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for message in &self.messages {
            let message = message.to_variant_map();
            let created = message
                .get("created")
                .map_or_else(String::new, |v| v.to_string());
            let text = message
                .get("message_text")
                .map_or_else(String::new, |v| v.to_string());

            writeln!(writer, "{}  {}", format_timestamp(&created), text)?;
        }

        Ok(())
    }
}

/// Renders a controller timestamp for table output; a value that is not
/// RFC 3339 is printed as-is.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_owned(),
        |stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn column_width(header: &str, values: impl Iterator<Item = String>) -> usize {
    values
        .map(|value| value.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
