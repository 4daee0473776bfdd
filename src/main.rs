use std::process::ExitCode;

use bobbin::{Config, Server, app};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let router = match app::router(&config) {
        Ok(router) => router,
        Err(e) => {
            tracing::error!("failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    match Server::bind(config.listen).serve(router).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
