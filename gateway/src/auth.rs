//! OAuth2 client-credentials token management.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Holds the process-wide bearer token and refreshes it on demand.
///
/// There is exactly one token at a time; `acquire` replaces it wholesale
/// behind the write lock, so concurrent refreshes are serialized while
/// readers take a cheap snapshot. No expiry is tracked: staleness is
/// discovered reactively through a 401 response.
pub struct TokenManager {
    http_client: Client,
    config: Arc<GatewayConfig>,
    token: Arc<RwLock<Option<String>>>,
}

impl TokenManager {
    pub fn new(http_client: Client, config: Arc<GatewayConfig>) -> Self {
        Self {
            http_client,
            config,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns a snapshot of the current token, if one is held.
    pub async fn current(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Performs the client-credentials exchange and stores the new token.
    ///
    /// A non-success status from the token endpoint is fatal for the
    /// in-flight request; retry policy lives in the request executor, not
    /// here.
    pub async fn acquire(&self) -> Result<String> {
        info!("Acquiring new access token");

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", self.config.grant_type.as_str()),
            ("resource", self.config.resource.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status = status, body = %body, "Access token request failed");
            return Err(GatewayError::Authentication(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            GatewayError::Authentication(format!("failed to parse token response: {e}"))
        })?;

        let mut held = self.token.write().await;
        *held = Some(token_response.access_token.clone());

        Ok(token_response.access_token)
    }
}
