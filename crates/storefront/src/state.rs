//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiResult, MarketplaceClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheap to clone. The API client carries its own connection pool and
/// catalog cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: MarketplaceClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> ApiResult<Self> {
        let api = MarketplaceClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the marketplace API client.
    #[must_use]
    pub fn api(&self) -> &MarketplaceClient {
        &self.inner.api
    }
}
