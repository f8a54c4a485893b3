//! The full storefront router driven with `oneshot` against a mock backend.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use bazaar_integration_tests::{
    app_for, body_text, cart_json, category_json, envelope, get, login_json, page_of,
    post_form, product_json, session_cookie,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            category_json("c1", "Tea", None, "tea"),
            category_json("c2", "Green", Some("c1"), "green"),
        ]))))
        .mount(&server)
        .await;
    server
}

/// Sign in through the login form and return the session cookie.
async fn sign_in(app: &axum::Router, server: &MockServer, role: &str) -> String {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json(role)))
        .mount(server)
        .await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/auth/login",
            &format!("email={role}%40example.com&password=hunter22"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).expect("session cookie after login")
}

// ---------------------------------------------------------------------------
// Public pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_is_ok() {
    let server = MockServer::start().await;
    let response = app_for(&server).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_follows_backend() {
    let server = MockServer::start().await;
    let app = app_for(&server);
    let response = app.clone().oneshot(get("/health/ready", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let server = backend().await;
    let response = app_for(&server)
        .oneshot(get("/health/ready", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_page_shows_menu_and_featured() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/products/featured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([product_json(
            "p1",
            "Sencha",
            "12.00",
            8
        )]))))
        .mount(&server)
        .await;

    let response = app_for(&server).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    let body = body_text(response).await;
    assert!(body.contains("/categories/tea"));
    assert!(body.contains("/categories/green"));
    assert!(body.contains("Sencha"));
}

#[tokio::test]
async fn test_product_list_clamps_page_past_the_end() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(vec![], 2, 30)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(
            vec![product_json("p9", "Oolong", "20.00", 3)],
            2,
            30,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(get("/products?page=9", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Oolong"));
}

#[tokio::test]
async fn test_unapproved_product_is_not_found() {
    let server = backend().await;
    let mut pending = product_json("p2", "Secret blend", "9.00", 1);
    pending["status"] = json!("pending");
    Mock::given(method("GET"))
        .and(path("/products/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(pending)))
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(get("/products/p2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!body_text(response).await.contains("Secret blend"));
}

#[tokio::test]
async fn test_unknown_route_renders_error_page() {
    let server = backend().await;
    let response = app_for(&server)
        .oneshot(get("/no/such/page", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

// ---------------------------------------------------------------------------
// Mini-cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mini_cart_opens_for_guest_and_closes_quietly() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/cart/guest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({"exists": true, "totalItems": 2}))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(cart_json(2))))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let response = app.clone().oneshot(get("/cart/mini", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("guest session");
    assert!(body_text(response).await.contains("Green tea"));

    // Reopening while open reuses the snapshot.
    let response = app
        .clone()
        .oneshot(get("/cart/mini", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_form("/cart/mini/close", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_add_to_cart_error_is_escaped() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/cart/items"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "<b>Only 2 left</b> in Tom's shop"})),
        )
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(post_form("/cart/add", "product_id=p1&quantity=5", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("cart-error"));
    assert!(body.contains("&lt;b&gt;Only 2 left"));
    assert!(!body.contains("<b>"));
    assert!(!body.contains("Tom's"));
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let server = backend().await;
    let response = app_for(&server)
        .oneshot(get("/vendor/products", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");
}

#[tokio::test]
async fn test_vendor_cannot_moderate() {
    let server = backend().await;
    let app = app_for(&server);
    let cookie = sign_in(&app, &server, "vendor").await;

    let response = app
        .oneshot(get("/admin/products", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_vendor_sees_own_products() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/vendor/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(
            vec![product_json("p1", "Sencha", "12.00", 2)],
            1,
            1,
        )))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let cookie = sign_in(&app, &server, "vendor").await;
    let response = app
        .oneshot(get("/vendor/products", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Sencha"));
    assert!(body.contains("/vendor/products/bulk"));
}

#[tokio::test]
async fn test_partial_bulk_failure_is_multi_status() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/vendor/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(
            vec![
                product_json("p1", "Sencha", "12.00", 2),
                product_json("p2", "Matcha", "30.00", 9),
            ],
            1,
            2,
        )))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/vendor/products/p1/status"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/vendor/products/p2/status"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let cookie = sign_in(&app, &server, "vendor").await;
    let response = app
        .oneshot(post_form(
            "/vendor/products/bulk",
            "action=deactivate&ids=p1%2Cp2",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);

    // Only the failed row comes back checked for a retry.
    let body = body_text(response).await;
    assert!(body.contains(r#"value="p2" data-bulk-id checked"#));
    assert!(!body.contains(r#"value="p1" data-bulk-id checked"#));
}

#[tokio::test]
async fn test_bulk_rejects_moderation_action_for_vendor() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/vendor/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(vec![], 1, 0)))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let cookie = sign_in(&app, &server, "vendor").await;
    let response = app
        .oneshot(post_form(
            "/vendor/products/bulk",
            "action=approve&ids=p1",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_moderation_all_statuses_sends_no_status() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/admin/products"))
        .and(query_param_is_missing("status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(
            vec![product_json("p1", "Sencha", "12.00", 2)],
            2,
            21,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let cookie = sign_in(&app, &server, "admin").await;
    let response = app
        .oneshot(get("/admin/products?status=all", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Pager links still spell out "all" so they do not fall back to pending.
    let body = body_text(response).await;
    assert!(body.contains("status=all&amp;page=2") || body.contains("status=all&page=2"));
}
