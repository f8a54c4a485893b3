//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. Security headers
//! 6. Rate limiting (governor) on login and cart mutations

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, RequireVendor, caller_for,
    clear_current_user, guest_id, set_current_user,
};
pub use rate_limit::{auth_rate_limiter, cart_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
