//! Authenticated request execution against the upstream Graph API.

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use tracing::{debug, info};

use crate::auth::TokenManager;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

/// HTTP client for the upstream API.
///
/// Wraps every request with the current bearer token, acquiring one lazily
/// on first use. A 401 response triggers exactly one token refresh and one
/// retry of the identical request; a second 401 is returned to the caller
/// as-is. Other non-success statuses are never interpreted here.
pub struct GraphClient {
    http_client: Client,
    tokens: TokenManager,
    config: Arc<GatewayConfig>,
}

impl GraphClient {
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            tokens: TokenManager::new(http_client.clone(), config.clone()),
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Joins the configured base URL with a relative path.
    pub fn join(&self, path: &str) -> String {
        let base = &self.config.base_url;
        match (base.ends_with('/'), path.starts_with('/')) {
            (true, true) => format!("{}{}", base, &path[1..]),
            (true, false) | (false, true) => format!("{base}{path}"),
            (false, false) => format!("{base}/{path}"),
        }
    }

    /// Whether a bearer token is currently held.
    pub async fn has_token(&self) -> bool {
        self.tokens.current().await.is_some()
    }

    async fn send_with_token(
        &self,
        method: &Method,
        url: &str,
        query: Option<&[(String, String)]>,
        token: &str,
    ) -> Result<Response> {
        let mut request = self
            .http_client
            .request(method.clone(), url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/json");
        if let Some(args) = query {
            request = request.query(args);
        }
        Ok(request.send().await?)
    }

    /// Issues a request with the current bearer token attached.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        query: Option<&[(String, String)]>,
    ) -> Result<Response> {
        let token = match self.tokens.current().await {
            Some(token) => token,
            None => self.tokens.acquire().await?,
        };

        debug!(url = %url, "Making upstream API request");
        let response = self.send_with_token(&method, url, query, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Stale token: refresh once and resend the identical request once.
        info!(url = %url, "Received 401, refreshing access token and retrying");
        let token = self.tokens.acquire().await?;
        self.send_with_token(&method, url, query, &token).await
    }

    /// Convenience GET without query arguments.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(Method::GET, url, None).await
    }

    /// Plain unauthenticated GET, used for pre-signed download URLs that must
    /// not carry the bearer header.
    pub async fn get_unauthenticated(&self, url: &str) -> Result<Response> {
        Ok(self.http_client.get(url).send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base_url: &str) -> GraphClient {
        let config = GatewayConfig {
            base_url: base_url.to_string(),
            ..GatewayConfig::default()
        };
        GraphClient::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_join_handles_slashes() {
        let client = client_with_base("https://graph.example.com/v1.0/");
        assert_eq!(
            client.join("users"),
            "https://graph.example.com/v1.0/users"
        );
        assert_eq!(
            client.join("/users"),
            "https://graph.example.com/v1.0/users"
        );

        let client = client_with_base("https://graph.example.com/v1.0");
        assert_eq!(
            client.join("users"),
            "https://graph.example.com/v1.0/users"
        );
    }
}
