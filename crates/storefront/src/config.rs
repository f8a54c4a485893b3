//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKETPLACE_API_URL` - Base URL of the marketplace REST API
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `MARKETPLACE_API_KEY` - Server-side API key sent as `X-Api-Key` (high entropy)
//! - `MARKETPLACE_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Category/featured product cache TTL (default: 300)
//! - `CART_FRESHNESS_SECS` - Age after which a cached cart is stale (default: 60)
//! - `LIST_PER_PAGE` - Rows per page on list pages (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Marketplace backend configuration
    pub api: MarketplaceApiConfig,
    /// How long an unrefreshed cart snapshot counts as fresh
    pub cart_freshness: Duration,
    /// Rows per page on list pages
    pub list_per_page: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Marketplace REST API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct MarketplaceApiConfig {
    /// Base URL, e.g. `https://api.bazaar.example/v1`
    pub base_url: Url,
    /// Optional server-side API key
    pub api_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// TTL of cached catalog reads
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for MarketplaceApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl MarketplaceApiConfig {
    /// Configuration pointing at `base_url` with default timeouts and no key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("MARKETPLACE_API_URL", base_url)?,
            api_key: None,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("MARKETPLACE_API_URL")?;
        let api_key = get_optional_env("MARKETPLACE_API_KEY")
            .map(|key| {
                validate_secret_strength(&key, "MARKETPLACE_API_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(key))
            })
            .transpose()?;

        Ok(Self {
            base_url: parse_base_url("MARKETPLACE_API_URL", &base_url)?,
            api_key,
            timeout: Duration::from_secs(get_parsed_env("MARKETPLACE_API_TIMEOUT_SECS", 10)?),
            cache_ttl: Duration::from_secs(get_parsed_env("CATALOG_CACHE_TTL_SECS", 300)?),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_env("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = get_parsed_env("STOREFRONT_PORT", 3000_u16)?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let api = MarketplaceApiConfig::from_env()?;
        let cart_freshness = Duration::from_secs(get_parsed_env("CART_FRESHNESS_SECS", 60)?);
        let list_per_page = get_parsed_env("LIST_PER_PAGE", 20_u32)?;
        if list_per_page == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LIST_PER_PAGE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            api,
            cart_freshness,
            list_per_page,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_env("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_parsed_env("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Configuration for tests and local tooling: everything defaulted except
    /// the backend URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` does not parse.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api: MarketplaceApiConfig::new(api_url)?,
            cart_freshness: Duration::from_secs(60),
            list_per_page: 20,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional environment variable, falling back to `default`.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a base URL, forcing a trailing slash so relative joins keep the path.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-api-key-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("K", "https://api.bazaar.test/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.bazaar.test/v1/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "https://api.bazaar.test/v1/products"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("K", "not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_base_url("K", "mailto:someone").is_err());
    }

    #[test]
    fn test_socket_addr_and_https() {
        let mut config = StorefrontConfig::for_api("http://localhost:4000/api").unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_https());

        config.base_url = "https://bazaar.test".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_api_config_debug_redacts_key() {
        let mut api = MarketplaceApiConfig::new("http://localhost:4000").unwrap();
        api.api_key = Some(SecretString::from("k7#Qz!9pLm2@Xw4$"));

        let debug_output = format!("{api:?}");

        assert!(debug_output.contains("localhost:4000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("k7#Qz!9pLm2@Xw4$"));
    }
}
