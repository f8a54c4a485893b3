//! Integration tests for the Bazaar storefront.
//!
//! Every test stands up a `wiremock` server in place of the marketplace
//! backend, so nothing leaves the machine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! # Test Files
//!
//! - `api_client` - REST client envelopes, headers, errors and caching
//! - `mini_cart` - the mini-cart gate driven against the mock backend
//! - `storefront_routes` - the full router, request by request

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use bazaar_storefront::api::MarketplaceClient;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::state::AppState;
use serde_json::{Value, json};
use wiremock::MockServer;

/// A client pointed at the mock backend.
///
/// # Panics
///
/// Panics if the mock server URI does not parse, which wiremock never produces.
#[must_use]
pub fn client_for(server: &MockServer) -> MarketplaceClient {
    let config = StorefrontConfig::for_api(&server.uri()).expect("mock server URI");
    MarketplaceClient::new(&config.api).expect("HTTP client")
}

/// The full storefront router backed by the mock server.
///
/// # Panics
///
/// Panics if the state cannot be built.
#[must_use]
pub fn app_for(server: &MockServer) -> Router {
    let config = StorefrontConfig::for_api(&server.uri()).expect("mock server URI");
    bazaar_storefront::app(AppState::new(config).expect("app state"))
}

/// `{ "data": value }`.
#[must_use]
pub fn envelope(data: Value) -> Value {
    json!({ "data": data })
}

/// A paginated list body.
#[must_use]
pub fn page_of(data: Vec<Value>, total_pages: u32, total_items: u64) -> Value {
    json!({ "data": data, "totalPages": total_pages, "totalItems": total_items })
}

/// An approved, active product.
#[must_use]
pub fn product_json(id: &str, name: &str, price: &str, inventory: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "A fine thing",
        "price": price,
        "salePrice": null,
        "categoryId": "c1",
        "vendorId": "v1",
        "vendorName": "Tea Corner",
        "inventory": inventory,
        "isActive": true,
        "status": "approved",
        "images": []
    })
}

/// An approved category.
#[must_use]
pub fn category_json(id: &str, name: &str, parent: Option<&str>, slug: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "parentId": parent,
        "slug": slug,
        "status": "approved"
    })
}

/// A cart with one line.
#[must_use]
pub fn cart_json(quantity: u32) -> Value {
    json!({
        "totalItems": quantity,
        "totalPrice": format!("{}.00", 12 * quantity),
        "items": [{
            "id": "line-1",
            "productId": "p1",
            "name": "Green tea",
            "price": "12.00",
            "quantity": quantity
        }]
    })
}

/// A login response for a user with `role`.
#[must_use]
pub fn login_json(role: &str) -> Value {
    envelope(json!({
        "token": format!("token-{role}"),
        "user": {
            "id": format!("u-{role}"),
            "email": format!("{role}@example.com"),
            "name": "Sam",
            "role": role,
            "vendorId": if role == "vendor" { Some("v1") } else { None }
        }
    }))
}

/// Response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// The `name=value` part of the response's session cookie, if one was set.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("bazaar_session="))
        .and_then(|v| v.split(';').next())
        .map(String::from)
}

/// A GET request, optionally carrying a session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

/// A form POST from a fixed client address, optionally carrying a session
/// cookie. The address lets rate-limited routes identify the client.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.10");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).expect("request")
}
