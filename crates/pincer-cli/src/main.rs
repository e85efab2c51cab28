//! Pincer CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pincer_cli::cli::{Cli, Commands};
use pincer_cli::commands::{ClusterCommand, JobCommand, NodeCommand, PingCommand};
use pincer_cli::output::OutputFormat;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), pincer_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let config = cli.client_config();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Cluster { command } => {
            let cmd = ClusterCommand::new(config);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Node { command } => {
            let cmd = NodeCommand::new(config);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Job { command } => {
            let cmd = JobCommand::new(config);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Ping => {
            let cmd = PingCommand::new(config);
            cmd.execute(&mut stdout, &format).await?;
        }
    }

    Ok(())
}
