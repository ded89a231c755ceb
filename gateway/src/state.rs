//! Application state shared by the Axum handlers.

use std::sync::Arc;

use crate::client::GraphClient;
use crate::config::GatewayConfig;
use crate::error::Result;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Upstream API client, shared by every in-flight request.
    pub graph: Arc<GraphClient>,
    /// Server configuration.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Creates a new application state from configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let config = Arc::new(config);
        Ok(Self {
            graph: Arc::new(GraphClient::new(config.clone())?),
            config,
        })
    }
}
