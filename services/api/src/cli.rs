use crate::jobs::{export_audit, run_pipeline, validate_file, ValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sales_gate::error::AppError;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "sales-gate",
    about = "Validate arriving sales files and route them to accepted or rejected storage",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP validation service (default command)
    Serve(ServeArgs),
    /// Process every file currently in the intake directory once
    Run,
    /// Validate a single file in place and print the validation response
    Validate(ValidateArgs),
    /// Print the audit log as a JSON array
    Audit,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<ExitCode, AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await.map(|()| ExitCode::SUCCESS),
        Command::Run => run_pipeline(),
        Command::Validate(args) => validate_file(args),
        Command::Audit => export_audit().map(|()| ExitCode::SUCCESS),
    }
}
