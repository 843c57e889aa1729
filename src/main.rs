//! MotoPro Gateway - privileged API proxy for the dispatch dashboard

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use motopro_gateway::{
    cli::{Cli, Command},
    config::Config,
    gateway::GatewayServer,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Some(Command::Serve) | None => run_server(cli).await,
    }
}

/// Load configuration, apply CLI overrides, run the server
async fn run_server(cli: Cli) -> ExitCode {
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    match GatewayServer::new(config).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Gateway failed: {e}");
            ExitCode::FAILURE
        }
    }
}
