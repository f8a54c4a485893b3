//! Authentication route handlers.
//!
//! Login is a pass-through to the marketplace backend: the returned token and
//! user record go into the session. Registration and password resets happen
//! on the backend's own pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::cart_context::invalidate_cart;
use crate::state::AppState;
use crate::views::NavView;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavView,
    pub error: Option<String>,
}

/// Message for a `?error=` code.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "invalid_credentials" => "Invalid email or password.",
        "rate_limited" => "Too many attempts. Please wait a moment and try again.",
        "session" => "We could not sign you in. Please try again.",
        _ => "Sign-in is unavailable right now. Please try again.",
    }
}

/// Where a user lands after signing in.
const fn landing_page(user: &CurrentUser) -> &'static str {
    match user.role {
        bazaar_core::UserRole::Vendor => "/vendor/products",
        bazaar_core::UserRole::Admin => "/admin/products",
        bazaar_core::UserRole::Customer => "/",
    }
}

/// Display the login page.
#[instrument(skip(state, session, user))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Some(user) = &user {
        return Redirect::to(landing_page(user)).into_response();
    }

    LoginTemplate {
        nav: NavView::load(&state, &session, None).await,
        error: query
            .error
            .as_deref()
            .map(|code| login_error_message(code).to_string()),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let guest_id = session
        .get::<String>(session_keys::GUEST_ID)
        .await
        .ok()
        .flatten();
    let password = SecretString::from(form.password);

    match state
        .api()
        .login(form.email.trim(), &password, guest_id.as_deref())
        .await
    {
        Ok(login) => {
            let user = CurrentUser::from(login);

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }
            // The guest cart was merged into the user's cart.
            if let Err(e) = invalidate_cart(&session).await {
                tracing::warn!("Failed to invalidate cart after login: {}", e);
            }
            set_sentry_user(&user.id, Some(&user.email));
            tracing::info!(user_id = %user.id, role = %user.role, "User signed in");

            Redirect::to(landing_page(&user)).into_response()
        }
        Err(ApiError::Unauthorized | ApiError::Validation(_) | ApiError::NotFound(_)) => {
            tracing::info!("Login rejected");
            Redirect::to("/auth/login?error=invalid_credentials").into_response()
        }
        Err(ApiError::RateLimited(_)) => {
            Redirect::to("/auth/login?error=rate_limited").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            Redirect::to("/auth/login?error=unavailable").into_response()
        }
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    if let Err(e) = invalidate_cart(&session).await {
        tracing::warn!("Failed to invalidate cart after logout: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            login_error_message("invalid_credentials"),
            "Invalid email or password."
        );
        assert!(login_error_message("bogus").contains("unavailable"));
    }
}
