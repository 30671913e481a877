//! Configuration options for the Ledo client

use std::time::Duration;

/// Deployment environment the client talks to.
///
/// Chosen once at construction; there is no runtime switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local backend during development
    Development,
    /// The production storefront API
    Production,
}

impl Environment {
    /// The default base URL for this environment, without the `/api` prefix
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://127.0.0.1:8000",
            Environment::Production => "https://api.perfumarialedo.com.br",
        }
    }
}

/// Configuration options for the Ledo client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Which backend deployment to talk to
    pub environment: Environment,

    /// Overrides the environment's base URL (self-hosted backends, tests)
    pub base_url: Option<String>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// WhatsApp number orders are handed off to, in international format
    pub store_phone: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            base_url: None,
            request_timeout: Some(Duration::from_secs(30)),
            store_phone: "5511999999999".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the deployment environment
    pub fn with_environment(mut self, value: Environment) -> Self {
        self.environment = value;
        self
    }

    /// Override the base URL entirely
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = Some(value.trim_end_matches('/').to_string());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the WhatsApp number used for checkout handoff
    pub fn with_store_phone(mut self, value: &str) -> Self {
        self.store_phone = value.to_string();
        self
    }

    /// The resolved base URL for API requests, including the `/api` prefix
    pub fn api_url(&self) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());
        format!("{}/api", base)
    }
}
