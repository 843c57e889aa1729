//! Gateway server

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use super::forwarder::{ApiForwarder, HttpForwarder};
use super::router::{AppState, create_router};
use crate::auth::ApiBridge;
use crate::config::Config;
use crate::{Error, Result};

/// Local control-surface server for the dispatch shell
pub struct GatewayServer {
    /// Configuration
    config: Config,
}

impl GatewayServer {
    /// Create a new gateway server
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the gateway until shutdown
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let forwarder = Arc::new(HttpForwarder::new(&self.config)?);
        let bridge = Arc::new(ApiBridge::new(
            Arc::clone(&forwarder) as Arc<dyn ApiForwarder>,
            self.config.api.login_path.clone(),
            self.config.api.refresh_path.clone(),
        ));

        let state = Arc::new(AppState {
            bridge,
            forwarder: Arc::clone(&forwarder),
        });

        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;

        info!("============================================================");
        info!("MOTOPRO GATEWAY v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");
        info!(host = %self.config.server.host, port = %self.config.server.port, "Listening");
        info!(base_url = %forwarder.base_url(), "Forwarding to remote API");
        info!("  POST   /api/request      (authenticated proxy)");
        info!("  PUT    /api/base-url     (remote API override)");
        info!("  POST   /session/login    (token acquisition)");
        info!("  POST   /session/tokens   (token injection)");
        info!("  DELETE /session/tokens   (logout)");
        info!("  GET    /config/deallocation, /config/establishment");
        info!("============================================================");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!("Gateway stopped");
        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
