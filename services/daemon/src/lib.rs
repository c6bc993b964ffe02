mod cli;
mod daemon;
mod demo;
mod infra;

use fleet_reminder::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
