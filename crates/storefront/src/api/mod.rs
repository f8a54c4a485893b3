//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the backend is the source of truth
//! - Responses arrive in `{ "data": ... }` envelopes, list endpoints add
//!   `totalPages` / `totalItems`
//! - Public catalog reads (categories, featured products) are cached with
//!   `moka`; carts, vendor and admin data never are
//!
//! Endpoint groups live in their own modules as `impl MarketplaceClient`
//! blocks: [`catalog`], [`cart`], [`auth`], [`vendor`], [`admin`].
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::api::{Caller, MarketplaceClient};
//!
//! let client = MarketplaceClient::new(&config.api)?;
//! let categories = client.categories().await?;
//! let cart = client.get_cart(&Caller::guest("9b1c...")).await?;
//! ```

pub mod admin;
pub mod auth;
mod cache;
pub mod cart;
pub mod catalog;
mod client;
pub mod vendor;

pub use client::MarketplaceClient;

use bazaar_core::Pagination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the marketplace backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or expired credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Credentials valid but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// The backend rejected the input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// Message safe to render in a page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Not found".to_string(),
            Self::Unauthorized => "Please sign in again".to_string(),
            Self::Forbidden => "You do not have access to this".to_string(),
            Self::Validation(message) => message.clone(),
            Self::RateLimited(_) => "Too many requests, please wait a moment".to_string(),
            Self::Http(_) | Self::Parse(_) | Self::Url(_) | Self::Status { .. } => {
                "The marketplace is not responding".to_string()
            }
        }
    }

    /// Whether the caller's token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Who a request is made for.
///
/// Signed-in users send a bearer token; guests send their guest id so the
/// backend can find their cart. Both may be present right after login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub token: Option<String>,
    pub guest_id: Option<String>,
}

impl Caller {
    /// No credentials; public catalog reads only.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A guest identified by their session guest id.
    #[must_use]
    pub fn guest(guest_id: impl Into<String>) -> Self {
        Self {
            token: None,
            guest_id: Some(guest_id.into()),
        }
    }

    /// A signed-in user.
    #[must_use]
    pub fn user(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            guest_id: None,
        }
    }

    /// Whether a bearer token is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// `{ "data": T }` response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Paginated list envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default = "one")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
}

const fn one() -> u32 {
    1
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl<T> Paginated<T> {
    /// Navigation for this page of results.
    #[must_use]
    pub const fn pagination(&self, current: u32) -> Pagination {
        Pagination::new(current, self.total_pages, self.total_items)
    }
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extract a message from a raw body, if it is a JSON error body.
    pub(crate) fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
    }
}
