mod cli;
mod infra;
mod jobs;
mod routes;
mod server;

use sales_gate::error::AppError;
use std::process::ExitCode;

pub async fn run() -> Result<ExitCode, AppError> {
    cli::run().await
}
