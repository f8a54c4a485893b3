//! HTTP plumbing shared by every endpoint group.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use moka::future::Cache;
use reqwest::Method;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, ApiResult, Caller, ErrorBody};
use crate::config::MarketplaceApiConfig;

/// Header carrying the guest id for anonymous carts.
pub const GUEST_ID_HEADER: &str = "X-Guest-Id";

/// Header carrying the server-side API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct MarketplaceClient {
    inner: Arc<MarketplaceClientInner>,
}

struct MarketplaceClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl MarketplaceClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &MarketplaceApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaar-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(MarketplaceClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                cache,
            }),
        })
    }

    pub(super) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send one request and decode the response body.
    ///
    /// Empty bodies decode as JSON `null`, so `T = ()` or
    /// `serde::de::IgnoredAny` work for endpoints that return nothing.
    #[instrument(skip(self, caller, query, body), fields(method = %method, path = %path))]
    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        caller: &Caller,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .inner
            .client
            .request(method, self.url(path)?)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(key) = &self.inner.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }
        if let Some(token) = &caller.token {
            request = request.bearer_auth(token);
        }
        if let Some(guest_id) = &caller.guest_id {
            request = request.header(GUEST_ID_HEADER, guest_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(status = %status, elapsed_ms = started.elapsed().as_millis(), "Marketplace API response");

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, path, &response_text));
        }

        let body = if response_text.trim().is_empty() {
            "null"
        } else {
            response_text.as_str()
        };

        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse marketplace API response"
            );
            ApiError::Parse(e)
        })
    }

    /// `GET` with query parameters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or bad JSON.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        caller: &Caller,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        self.execute::<T, ()>(Method::GET, path, caller, query, None)
            .await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or bad JSON.
    pub async fn post<T, B>(&self, path: &str, caller: &Caller, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, caller, &[], Some(body))
            .await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or bad JSON.
    pub async fn put<T, B>(&self, path: &str, caller: &Caller, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, caller, &[], Some(body))
            .await
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or bad JSON.
    pub async fn patch<T, B>(&self, path: &str, caller: &Caller, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PATCH, path, caller, &[], Some(body))
            .await
    }

    /// `DELETE`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-success status.
    pub async fn delete(&self, path: &str, caller: &Caller) -> ApiResult<()> {
        self.execute::<serde::de::IgnoredAny, ()>(Method::DELETE, path, caller, &[], None)
            .await?;
        Ok(())
    }
}

/// Percent-encode an opaque id for use as a path segment.
pub(super) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

fn status_error(status: reqwest::StatusCode, path: &str, body: &str) -> ApiError {
    let message = ErrorBody::message_from(body);
    match status.as_u16() {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound(path.to_string()),
        400 | 409 | 422 => {
            ApiError::Validation(message.unwrap_or_else(|| "Invalid request".to_string()))
        }
        code => {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Marketplace API returned non-success status"
            );
            ApiError::Status {
                status: code,
                message: message
                    .unwrap_or_else(|| body.chars().take(200).collect::<String>()),
            }
        }
    }
}
