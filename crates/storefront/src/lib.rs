//! Bazaar storefront library.
//!
//! The server-rendered web client of the Bazaar marketplace: public catalog,
//! cart and mini-cart, vendor dashboard and admin moderation. Everything is
//! served from the marketplace REST backend; this crate keeps no database.
//!
//! Exposed as a library so the router can be driven from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

use axum::{Router, middleware::from_fn};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Directory of CSS, JS and images served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router with its middleware stack.
///
/// Layers are listed innermost first; see [`middleware`] for the order as
/// seen by a request.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .layer(from_fn(middleware::security_headers_middleware))
        // Added after the header layer so static assets stay cacheable.
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
