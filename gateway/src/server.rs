//! Server setup and lifecycle for the gateway.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::routes::create_router;
use crate::state::AppState;

/// The gateway HTTP server.
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    /// Creates a new server instance with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Creates a server instance from an existing `AppState`.
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Runs the HTTP server.
    ///
    /// This method blocks until the server is shut down (e.g., via Ctrl+C).
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.state.config.host, self.state.config.port)
            .parse()
            .map_err(|e| GatewayError::Configuration(format!("Invalid address: {e}")))?;

        let router = create_router(self.state);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| GatewayError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(%addr, "Graph gateway server starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Server(format!("Server error: {e}")))?;

        tracing::info!("Graph gateway server stopped");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Signal handler for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

/// Entry point for running the server from configuration.
pub async fn run_server(config: GatewayConfig) -> Result<()> {
    let server = GatewayServer::new(config)?;
    server.run().await
}

/// Entry point for running the server from environment variables.
///
/// Initializes the tracing subscriber from `LOG_LEVEL`, then loads the
/// configuration; missing required settings are fatal and reported together.
pub async fn run_from_env() -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::try_new(&log_level).unwrap_or_else(|_| {
        eprintln!("Unsupported log level '{log_level}' defined. Using default level 'info'");
        tracing_subscriber::EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration is incomplete");
            return Err(e);
        }
    };

    run_server(config).await
}
