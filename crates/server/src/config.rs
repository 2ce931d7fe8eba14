//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com).
//!   `SHOP_DOMAIN` is accepted as a fallback.
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (HIGH PRIVILEGE).
//!   `SHOP_TOKEN` is accepted as a fallback.
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `SHOPIFY_GRAPHQL_URL` - Override the GraphQL endpoint (testing, proxies)
//! - `STATIC_DIR` - Directory of a built dashboard bundle to serve at `/`
//! - `EXPORT_SAMPLE_CAP` - Records kept inline on completed jobs (default: 1000)
//! - `EXPORT_FAILURE_POLICY` - `best_effort` or `fail_fast` (default: `best_effort`)
//! - `EXPORT_JOB_RETENTION_SECS` - How long finished jobs stay queryable (default: 3600)
//! - `EXPORT_SWEEP_INTERVAL_SECS` - How often finished jobs are swept (default: 300)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use orderdesk_core::DEFAULT_SAMPLE_CAP;
use secrecy::SecretString;
use thiserror::Error;

use crate::export::FailurePolicy;

const DEFAULT_API_VERSION: &str = "2025-01";
const DEFAULT_PORT: &str = "5000";
const DEFAULT_RETENTION_SECS: u64 = 3600;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Export job configuration
    pub export: ExportConfig,
    /// Directory of static dashboard assets (optional)
    pub static_dir: Option<PathBuf>,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// Explicit GraphQL endpoint, overriding the one derived from `store`
    pub endpoint_override: Option<url::Url>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("endpoint_override", &self.endpoint_override)
            .finish()
    }
}

impl ShopifyConfig {
    /// The Admin GraphQL endpoint requests are sent to.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        self.endpoint_override.as_ref().map_or_else(
            || {
                format!(
                    "https://{}/admin/api/{}/graphql.json",
                    self.store, self.api_version
                )
            },
            ToString::to_string,
        )
    }

    fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env_with_fallback("SHOPIFY_STORE", "SHOP_DOMAIN")?;
        let token = get_required_env_with_fallback("SHOPIFY_ACCESS_TOKEN", "SHOP_TOKEN")?;
        validate_secret_strength(&token, "SHOPIFY_ACCESS_TOKEN")?;

        let endpoint_override = get_optional_env("SHOPIFY_GRAPHQL_URL")
            .map(|raw| {
                url::Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPIFY_GRAPHQL_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            store,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: SecretString::from(token),
            endpoint_override,
        })
    }
}

/// Export job configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Records kept inline on a completed job's status payload
    pub sample_cap: usize,
    /// How collection reacts to a failed page after the first
    pub failure_policy: FailurePolicy,
    /// How long finished jobs remain queryable
    pub job_retention: Duration,
    /// How often finished jobs are swept from the registry
    pub sweep_interval: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
            failure_policy: FailurePolicy::default(),
            job_retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl ExportConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sample_cap = parse_optional_env("EXPORT_SAMPLE_CAP")?.unwrap_or(DEFAULT_SAMPLE_CAP);
        let failure_policy = get_optional_env("EXPORT_FAILURE_POLICY")
            .map(|raw| {
                raw.parse::<FailurePolicy>().map_err(|e| {
                    ConfigError::InvalidEnvVar("EXPORT_FAILURE_POLICY".to_string(), e)
                })
            })
            .transpose()?
            .unwrap_or_default();
        let retention_secs =
            parse_optional_env("EXPORT_JOB_RETENTION_SECS")?.unwrap_or(DEFAULT_RETENTION_SECS);
        let sweep_secs = parse_optional_env("EXPORT_SWEEP_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

        if sweep_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EXPORT_SWEEP_INTERVAL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            sample_cap,
            failure_policy,
            job_retention: Duration::from_secs(retention_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyConfig::from_env()?;
        let export = ExportConfig::from_env()?;
        let static_dir = get_optional_env("STATIC_DIR").map(PathBuf::from);
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            host,
            port,
            shopify,
            export,
            static_dir,
            json_logs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable, falling back to a legacy name.
fn get_required_env_with_fallback(primary: &str, fallback: &str) -> Result<String, ConfigError> {
    get_required_env(primary).or_else(|_| {
        std::env::var(fallback).map_err(|_| ConfigError::MissingEnvVar(primary.to_string()))
    })
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable.
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Reject obvious placeholder values for secrets.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
