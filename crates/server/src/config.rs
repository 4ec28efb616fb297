//! Server configuration

use thiserror::Error;

/// Configuration error raised during startup validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Server configuration loaded from environment variables.
///
/// Construction is the single validation point: required collaborator
/// identifiers are checked here so the rest of the code never reaches into
/// the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project hosting the warehouse dataset.
    pub gcp_project: String,
    /// OAuth bearer token for warehouse requests. Token provisioning
    /// (service accounts, refresh) is outside this service.
    pub bigquery_access_token: String,
    /// Warehouse dataset location, e.g. "US".
    pub bigquery_location: String,
    /// API key for the Gemini generateContent endpoint.
    pub gemini_api_key: String,
    /// Model identifier for the translation call.
    pub gemini_model: String,
    pub bind_address: String,
    /// Optional inbound API key; `None` disables request authentication.
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            gcp_project: require("GCP_PROJECT_ID")?,
            bigquery_access_token: require("BIGQUERY_ACCESS_TOKEN")?,
            bigquery_location: std::env::var("BIGQUERY_LOCATION").unwrap_or_else(|_| "US".into()),
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".into()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            api_key: std::env::var("API_KEY").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}
