//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use pincer_client::ClientConfig;

/// Pincer CLI — cluster management against a Pincer controller.
#[derive(Parser, Debug, Clone)]
#[command(name = "pincer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Controller host name.
    #[arg(short, long, env = "PINCER_CONTROLLER", default_value = "localhost")]
    pub controller: String,

    /// Controller port.
    #[arg(short = 'P', long, env = "PINCER_CONTROLLER_PORT", default_value_t = 9555)]
    pub port: u16,

    /// Wrap the connection in TLS.
    #[arg(long, env = "PINCER_USE_TLS")]
    pub tls: bool,

    /// RPC token sent with every request.
    #[arg(long, env = "PINCER_RPC_TOKEN")]
    pub token: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The transport configuration described by the global options.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.controller.clone(), self.port).with_tls(self.tls);
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// The raw reply as JSON, for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Cluster management commands.
    Cluster {
        /// Cluster subcommand to execute.
        #[command(subcommand)]
        command: ClusterCommands,
    },

    /// Node management commands.
    Node {
        /// Node subcommand to execute.
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Job management commands.
    Job {
        /// Job subcommand to execute.
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Check that the controller answers.
    Ping,
}

/// Cluster subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ClusterCommands {
    /// List all clusters the controller manages.
    List,

    /// Restart the nodes of a cluster one by one.
    ///
    /// The controller runs the restart as a job; with `--wait` the command
    /// polls the job until it reaches a terminal state.
    RollingRestart {
        /// Cluster to restart.
        #[arg(long)]
        cluster_id: i64,

        /// Poll the created job until it finishes.
        #[arg(long)]
        wait: bool,
    },
}

/// Node subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum NodeCommands {
    /// List the nodes of every cluster.
    List,
}

/// Job subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum JobCommands {
    /// List the job instances of a cluster.
    List {
        /// Cluster whose jobs to list.
        #[arg(long)]
        cluster_id: i64,
    },

    /// Print the log messages of a job.
    Log {
        /// Cluster the job belongs to.
        #[arg(long)]
        cluster_id: i64,

        /// Job to inspect.
        #[arg(long)]
        job_id: i64,

        /// Keep polling and printing new messages until the job reaches a
        /// terminal state.
        #[arg(short, long)]
        follow: bool,

        /// Seconds between polls in follow mode.
        #[arg(long, default_value_t = 3)]
        poll_interval: u64,
    },
}

impl JobCommands {
    /// The poll interval of a log command as a duration.
    #[must_use]
    pub fn poll_duration(&self) -> Duration {
        match self {
            Self::Log { poll_interval, .. } => Duration::from_secs((*poll_interval).max(1)),
            Self::List { .. } => Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_cluster_list_with_globals() {
        let cli = Cli::try_parse_from([
            "pincer",
            "--controller",
            "cmon.example.com",
            "-P",
            "9501",
            "--tls",
            "cluster",
            "list",
        ])
        .unwrap();

        assert_eq!(cli.controller, "cmon.example.com");
        assert_eq!(cli.port, 9501);
        assert!(cli.tls);
        assert!(matches!(
            cli.command,
            Commands::Cluster {
                command: ClusterCommands::List
            }
        ));

        let config = cli.client_config();
        assert_eq!(config.host, "cmon.example.com");
        assert!(config.use_tls);
        assert!(config.token.is_none());
    }

    #[test]
    fn parses_job_log_follow() {
        let cli = Cli::try_parse_from([
            "pincer",
            "job",
            "log",
            "--cluster-id",
            "1",
            "--job-id",
            "42",
            "--follow",
        ])
        .unwrap();

        match cli.command {
            Commands::Job {
                command:
                    JobCommands::Log {
                        cluster_id,
                        job_id,
                        follow,
                        poll_interval,
                    },
            } => {
                assert_eq!(cluster_id, 1);
                assert_eq!(job_id, 42);
                assert!(follow);
                assert_eq!(poll_interval, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_match_a_local_controller() {
        let cli = Cli::try_parse_from(["pincer", "ping"]).unwrap();
        assert_eq!(cli.controller, "localhost");
        assert_eq!(cli.port, 9555);
        assert!(!cli.tls);
        assert_eq!(cli.format, Format::Table);
    }
}
