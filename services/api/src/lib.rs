mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use repo_intake::error::AppError;
use std::process::ExitCode;

pub async fn run() -> Result<ExitCode, AppError> {
    cli::run().await
}
