mod cli;
mod infra;
mod report;
mod routes;
mod server;

use ba7ath::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
