//! Environment-driven configuration for the gateway.

use crate::error::{GatewayError, Result};

/// Default upstream API root when `BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0/";

const REQUIRED_ENV_VARS: &[&str] = &[
    "CLIENT_ID",
    "CLIENT_SECRET",
    "GRANT_TYPE",
    "RESOURCE",
    "ENTITIES_PATH",
    "NEXT_PAGE",
    "TOKEN_URL",
];

/// Configuration for the gateway server.
///
/// Resolved once at startup and shared read-only for the lifetime of the
/// process.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// OAuth2 client id for the client-credentials exchange.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// OAuth2 grant type (`client_credentials` for the Graph API).
    pub grant_type: String,
    /// Target resource submitted with the token request.
    pub resource: String,
    /// Dotted path locating the entity collection in a page response.
    pub entities_path: String,
    /// Dotted path locating the next-page cursor in a page response.
    pub next_page: String,
    /// Token endpoint URL.
    pub token_url: String,
    /// Upstream API root, joined with caller-supplied paths.
    pub base_url: String,
    /// Log level directive for the tracing subscriber.
    pub log_level: String,
    /// Optional delay between page fetches, in milliseconds.
    pub sleep_ms: Option<u64>,
    /// Host to bind the server to.
    pub host: String,
    /// Port to bind the server to.
    pub port: u16,
    /// SharePoint root URL, required only by the `/file` endpoint.
    pub sharepoint_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            grant_type: "client_credentials".to_string(),
            resource: String::new(),
            entities_path: "value".to_string(),
            next_page: "@odata.nextLink".to_string(),
            token_url: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: "info".to_string(),
            sleep_ms: None,
            host: "0.0.0.0".to_string(),
            port: 5000,
            sharepoint_url: None,
        }
    }
}

impl GatewayConfig {
    /// Creates a new configuration from environment variables.
    ///
    /// All missing required variables are reported together in a single
    /// `Configuration` error so operators can fix them in one pass.
    pub fn from_env() -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = std::collections::HashMap::new();
        for name in REQUIRED_ENV_VARS {
            match std::env::var(name) {
                Ok(value) if !value.is_empty() => {
                    required.insert(*name, value);
                }
                _ => missing.push(*name),
            }
        }

        if !missing.is_empty() {
            return Err(GatewayError::Configuration(format!(
                "Missing required environment variable(s): {}",
                missing.join(", ")
            )));
        }

        let mut take = |name: &str| required.remove(name).unwrap_or_default();

        Ok(Self {
            client_id: take("CLIENT_ID"),
            client_secret: take("CLIENT_SECRET"),
            grant_type: take("GRANT_TYPE"),
            resource: take("RESOURCE"),
            entities_path: take("ENTITIES_PATH"),
            next_page: take("NEXT_PAGE"),
            token_url: take("TOKEN_URL"),
            base_url: std::env::var("BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            sleep_ms: std::env::var("SLEEP").ok().and_then(|v| v.parse().ok()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            sharepoint_url: std::env::var("SHAREPOINT_URL").ok(),
        })
    }

    /// Creates a builder for configuration.
    #[must_use]
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }
}

/// Builder for `GatewayConfig`, used by tests and embedders.
#[derive(Default)]
pub struct GatewayConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    grant_type: Option<String>,
    resource: Option<String>,
    entities_path: Option<String>,
    next_page: Option<String>,
    token_url: Option<String>,
    base_url: Option<String>,
    log_level: Option<String>,
    sleep_ms: Option<u64>,
    host: Option<String>,
    port: Option<u16>,
    sharepoint_url: Option<String>,
}

impl GatewayConfigBuilder {
    #[must_use]
    pub fn client_id(mut self, value: impl Into<String>) -> Self {
        self.client_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn client_secret(mut self, value: impl Into<String>) -> Self {
        self.client_secret = Some(value.into());
        self
    }

    #[must_use]
    pub fn grant_type(mut self, value: impl Into<String>) -> Self {
        self.grant_type = Some(value.into());
        self
    }

    #[must_use]
    pub fn resource(mut self, value: impl Into<String>) -> Self {
        self.resource = Some(value.into());
        self
    }

    #[must_use]
    pub fn entities_path(mut self, value: impl Into<String>) -> Self {
        self.entities_path = Some(value.into());
        self
    }

    #[must_use]
    pub fn next_page(mut self, value: impl Into<String>) -> Self {
        self.next_page = Some(value.into());
        self
    }

    #[must_use]
    pub fn token_url(mut self, value: impl Into<String>) -> Self {
        self.token_url = Some(value.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = Some(value.into());
        self
    }

    #[must_use]
    pub fn log_level(mut self, value: impl Into<String>) -> Self {
        self.log_level = Some(value.into());
        self
    }

    #[must_use]
    pub fn sleep_ms(mut self, value: u64) -> Self {
        self.sleep_ms = Some(value);
        self
    }

    #[must_use]
    pub fn host(mut self, value: impl Into<String>) -> Self {
        self.host = Some(value.into());
        self
    }

    #[must_use]
    pub fn port(mut self, value: u16) -> Self {
        self.port = Some(value);
        self
    }

    #[must_use]
    pub fn sharepoint_url(mut self, value: impl Into<String>) -> Self {
        self.sharepoint_url = Some(value.into());
        self
    }

    /// Builds the configuration, reporting every missing required field.
    pub fn build(self) -> Result<GatewayConfig> {
        let mut missing = Vec::new();
        if self.client_id.is_none() {
            missing.push("client_id");
        }
        if self.client_secret.is_none() {
            missing.push("client_secret");
        }
        if self.grant_type.is_none() {
            missing.push("grant_type");
        }
        if self.resource.is_none() {
            missing.push("resource");
        }
        if self.entities_path.is_none() {
            missing.push("entities_path");
        }
        if self.next_page.is_none() {
            missing.push("next_page");
        }
        if self.token_url.is_none() {
            missing.push("token_url");
        }
        if !missing.is_empty() {
            return Err(GatewayError::Configuration(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        }

        Ok(GatewayConfig {
            client_id: self.client_id.unwrap_or_default(),
            client_secret: self.client_secret.unwrap_or_default(),
            grant_type: self.grant_type.unwrap_or_default(),
            resource: self.resource.unwrap_or_default(),
            entities_path: self.entities_path.unwrap_or_default(),
            next_page: self.next_page.unwrap_or_default(),
            token_url: self.token_url.unwrap_or_default(),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            sleep_ms: self.sleep_ms,
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(5000),
            sharepoint_url: self.sharepoint_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in REQUIRED_ENV_VARS {
            std::env::remove_var(name);
        }
        for name in ["BASE_URL", "LOG_LEVEL", "SLEEP", "HOST", "PORT", "SHAREPOINT_URL"] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_config_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.sleep_ms.is_none());
        assert!(config.sharepoint_url.is_none());
    }

    #[test]
    fn test_builder_success() {
        let config = GatewayConfig::builder()
            .client_id("id")
            .client_secret("secret")
            .grant_type("client_credentials")
            .resource("https://graph.microsoft.com")
            .entities_path("value")
            .next_page("@odata.nextLink")
            .token_url("https://login.example.com/token")
            .base_url("https://graph.example.com/v1.0/")
            .sleep_ms(250)
            .port(3000)
            .sharepoint_url("https://tenant.sharepoint.com")
            .build()
            .unwrap();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.base_url, "https://graph.example.com/v1.0/");
        assert_eq!(config.sleep_ms, Some(250));
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.sharepoint_url.as_deref(),
            Some("https://tenant.sharepoint.com")
        );
    }

    #[test]
    fn test_builder_reports_all_missing_fields() {
        let result = GatewayConfig::builder().client_id("id").build();

        let err = result.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("client_secret"));
        assert!(message.contains("grant_type"));
        assert!(message.contains("token_url"));
        assert!(!message.contains("client_id,"));
    }

    #[test]
    #[serial]
    fn test_from_env_reports_missing_names() {
        clear_env();
        std::env::set_var("CLIENT_ID", "id");
        std::env::set_var("TOKEN_URL", "https://login.example.com/token");

        let err = GatewayConfig::from_env().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("CLIENT_SECRET"));
        assert!(message.contains("GRANT_TYPE"));
        assert!(message.contains("RESOURCE"));
        assert!(message.contains("ENTITIES_PATH"));
        assert!(message.contains("NEXT_PAGE"));
        assert!(!message.contains("TOKEN_URL"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_full() {
        clear_env();
        std::env::set_var("CLIENT_ID", "id");
        std::env::set_var("CLIENT_SECRET", "secret");
        std::env::set_var("GRANT_TYPE", "client_credentials");
        std::env::set_var("RESOURCE", "https://graph.microsoft.com");
        std::env::set_var("ENTITIES_PATH", "value");
        std::env::set_var("NEXT_PAGE", "@odata.nextLink");
        std::env::set_var("TOKEN_URL", "https://login.example.com/token");
        std::env::set_var("SLEEP", "100");
        std::env::set_var("PORT", "8081");

        let config = GatewayConfig::from_env().unwrap();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.sleep_ms, Some(100));
        assert_eq!(config.port, 8081);
        clear_env();
    }
}
