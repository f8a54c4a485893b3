//! Integration tests for `MarketplaceClient` against a mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use bazaar_core::{BulkAction, ListQuery, ProductFilter, ProductId};
use bazaar_integration_tests::{
    cart_json, category_json, client_for, envelope, page_of, product_json,
};
use bazaar_storefront::api::{ApiError, Caller};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_products_sends_filter_and_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("search", "tea"))
        .and(query_param("on_sale", "true"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(
            vec![product_json("p1", "Green tea", "12.00", 4)],
            3,
            41,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let filter = ProductFilter {
        search: Some("tea".to_string()),
        on_sale: true,
        ..ProductFilter::default()
    };
    let query = ListQuery {
        filter,
        page: 2,
        per_page: 20,
    };

    let page = client_for(&server).list_products(&query).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_items, 41);
    assert_eq!(page.data[0].name, "Green tea");
}

#[tokio::test]
async fn test_categories_are_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            category_json("c1", "Tea", None, "tea"),
            category_json("c2", "Green", Some("c1"), "green"),
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.categories().await.unwrap();
    let second = client.categories().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_invalidated_categories_are_refetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([category_json("c1", "Tea", None, "tea")]))),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.categories().await.unwrap();
    client.invalidate_categories().await;
    client.categories().await.unwrap();
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "No such product"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_product(&ProductId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
}

// ---------------------------------------------------------------------------
// Credentials and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_guest_requests_carry_guest_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("X-Guest-Id", "guest-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(cart_json(2))))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client_for(&server)
        .get_cart(&Caller::guest("guest-42"))
        .await
        .unwrap();
    assert_eq!(cart.total_items, 2);
    assert_eq!(cart.items.len(), 1);
}

#[tokio::test]
async fn test_signed_in_requests_carry_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cart/items"))
        .and(header("Authorization", "Bearer secret-token"))
        .and(body_json(json!({"productId": "p1", "quantity": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(cart_json(3))))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client_for(&server)
        .add_to_cart(&Caller::user("secret-token"), &ProductId::new("p1"), 3)
        .await
        .unwrap();
    assert_eq!(cart.total_items, 3);
}

#[tokio::test]
async fn test_validation_message_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cart/items"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Only 2 left in stock"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .add_to_cart(&Caller::guest("g"), &ProductId::new("p1"), 5)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Only 2 left in stock");
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_cart(&Caller::guest("g"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(7)), "got {err:?}");
}

#[tokio::test]
async fn test_unauthorized_is_detected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vendor/analytics"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .vendor_analytics(&Caller::user("expired"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

// ---------------------------------------------------------------------------
// Vendor bulk actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_vendor_bulk_actions_map_to_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/vendor/products/p1/status"))
        .and(body_json(json!({"isActive": false})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/vendor/products/p2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let caller = Caller::user("vendor-token");
    client
        .vendor_bulk_action(&caller, &ProductId::new("p1"), BulkAction::Deactivate)
        .await
        .unwrap();
    client
        .vendor_bulk_action(&caller, &ProductId::new("p2"), BulkAction::Delete)
        .await
        .unwrap();

    let err = client
        .vendor_bulk_action(&caller, &ProductId::new("p3"), BulkAction::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));
}
