//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (backend reachable)
//!
//! # Catalog
//! GET  /products                  - Filterable product listing
//! GET  /products/:id              - Product detail
//! GET  /categories                - Category tree
//! GET  /categories/:slug          - Category page with products
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart (triggers cartUpdated)
//! POST /cart/update               - Update quantity (cart_items fragment)
//! POST /cart/remove               - Remove item (cart_items fragment)
//! GET  /cart/count                - Cart count badge (fragment)
//! GET  /cart/mini                 - Open the mini-cart (fragment)
//! POST /cart/mini/close           - Close the mini-cart
//! POST /cart/checkout             - Redirect to the checkout URL
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action (rate limited)
//! POST /auth/logout               - Logout action
//!
//! # Vendor dashboard (requires vendor role)
//! GET  /vendor                    - Sales analytics
//! GET  /vendor/products           - Own products, filterable, bulk actions
//! GET  /vendor/inventory          - Stock levels
//! GET  /vendor/orders             - Orders containing own products
//! GET  /vendor/store              - Store settings
//!
//! # Admin (requires admin role)
//! GET  /admin/products            - Moderation queue
//! GET  /admin/categories          - Category tree management
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod home;
pub mod list;
pub mod products;
pub mod vendor;

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};

use crate::filters;
use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;
use crate::views::NavView;

/// Full-page error with the site header.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub nav: NavView,
    pub status: u16,
    pub title: String,
    pub message: String,
    status_code: StatusCode,
}

impl ErrorTemplate {
    /// Error page for `status` with a visitor-facing message.
    #[must_use]
    pub fn new(nav: NavView, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            nav,
            status: status.as_u16(),
            title: status
                .canonical_reason()
                .unwrap_or("Something went wrong")
                .to_string(),
            message: message.into(),
            status_code: status,
        }
    }

    /// 404 page for a missing `what` ("Product", "Category", ...).
    #[must_use]
    pub fn not_found(nav: NavView, what: &str) -> Self {
        Self::new(
            nav,
            StatusCode::NOT_FOUND,
            format!("{what} not found. It may have been removed."),
        )
    }
}

impl IntoResponse for ErrorTemplate {
    fn into_response(self) -> Response {
        match self.render() {
            Ok(html) => (self.status_code, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {e}");
                (self.status_code, self.message).into_response()
            }
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the cart routes router.
///
/// Mutations share one rate limiter; reads and the mini-cart toggle do not.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
        .layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/mini", get(cart::mini_open))
        .route("/mini/close", post(cart::mini_close))
        .merge(mutations)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/vendor", vendor::routes())
        .nest("/admin", admin::routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable when the category list cannot be fetched
/// from the marketplace backend.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().categories().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> Response {
    ErrorTemplate::not_found(NavView::default(), "Page").into_response()
}
