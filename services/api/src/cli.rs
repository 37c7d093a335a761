use crate::report::{run_risk_report, RiskReportArgs};
use crate::server;
use ba7ath::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Ba7ath Risk API",
    about = "Score the community-company registry and serve the BA7ATH risk index",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Offline scoring utilities for editorial use
    Risk {
        #[command(subcommand)]
        command: RiskCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RiskCommand {
    /// Score a registry export and print the ranked risk board
    Report(RiskReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured registry export path
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Risk {
            command: RiskCommand::Report(args),
        } => run_risk_report(args),
    }
}
