//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Fragment and form handlers return
//! `Result<T, AppError>`; full-page handlers usually catch backend errors and
//! render a page-local message instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Marketplace backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Api(err) => match err {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                ApiError::Forbidden => StatusCode::FORBIDDEN,
                ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Message safe to show to the visitor.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Session(_) => "Internal server error".to_string(),
            Self::Api(err) => err.user_message(),
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Api(ApiError::NotFound("/products/123".to_string()));
        assert!(err.to_string().starts_with("API error:"));
    }

    #[test]
    fn test_api_errors_map_to_gateway_statuses() {
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound("/products/x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Validation("bad".to_string()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::RateLimited(3))),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Forbidden)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_validation_message_reaches_visitor() {
        let err = AppError::Api(ApiError::Validation("Only 2 left in stock".to_string()));
        assert_eq!(err.public_message(), "Only 2 left in stock");
    }
}
