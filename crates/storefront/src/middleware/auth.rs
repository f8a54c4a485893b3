//! Authentication extractors and visitor session helpers.
//!
//! Role checks happen here so vendor and admin handlers receive a user that
//! is already known to hold the role.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::UserRole;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::Caller;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user of any role.
///
/// If the user is not logged in, HTML requests are redirected to the login
/// page and HTMX requests get `401`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a vendor account.
pub struct RequireVendor(pub CurrentUser);

/// Extractor that requires an admin account.
pub struct RequireAdmin(pub CurrentUser);

/// Why an auth extractor rejected the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for HTMX fragment requests).
    Unauthorized,
    /// Logged in without the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        }
    }
}

async fn user_from_parts(parts: &Parts) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| {
            if parts.headers.contains_key("hx-request") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
}

async fn user_with_role(parts: &Parts, role: UserRole) -> Result<CurrentUser, AuthRejection> {
    let user = user_from_parts(parts).await?;
    if user.role == role {
        Ok(user)
    } else {
        tracing::warn!(user_id = %user.id, required = %role, "Role check failed");
        Err(AuthRejection::Forbidden)
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireVendor
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_with_role(parts, UserRole::Vendor).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_with_role(parts, UserRole::Admin).await.map(Self)
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the logged-in user.
///
/// The session id is cycled first so a pre-login session id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the logged-in user (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// The visitor's guest id, created on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn guest_id(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(id) = session.get::<String>(session_keys::GUEST_ID).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(session_keys::GUEST_ID, &id).await?;
    Ok(id)
}

/// API credentials for the visitor: their token when logged in, otherwise
/// their guest id.
///
/// # Errors
///
/// Returns an error if the guest id cannot be read or stored.
pub async fn caller_for(
    session: &Session,
    user: Option<&CurrentUser>,
) -> Result<Caller, tower_sessions::session::Error> {
    match user {
        Some(user) => Ok(user.caller()),
        None => Ok(Caller::guest(guest_id(session).await?)),
    }
}
