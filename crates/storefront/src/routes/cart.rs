//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every successful mutation stores the returned cart in the session's cart
//! context, so the badge and mini-cart stay fresh without another fetch.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use bazaar_core::{Cart, CartItemId, MiniCartGate, ProductId};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::Caller;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, caller_for};
use crate::models::session_keys;
use crate::services::cart_context::invalidate_cart;
use crate::services::{ApiCartSource, CartContext, MiniCartOutcome, open_mini_cart};
use crate::state::AppState;
use crate::views::{CartView, NavView};

/// Maximum quantity accepted for a single line.
const MAX_LINE_QUANTITY: u32 = 99;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// `?error=` on the cart page.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub error: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: NavView,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Inline error next to an add-to-cart button (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_error.html")]
pub struct CartErrorTemplate {
    pub message: String,
}

/// Mini-cart dropdown fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/mini_cart.html")]
pub struct MiniCartTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Record a cart the backend returned and persist it.
async fn store_cart(session: &Session, cart: &Cart) -> Result<CartView> {
    let mut context = CartContext::load(session).await?;
    context.record(cart.clone(), Utc::now());
    context.save(session).await?;
    Ok(CartView::from(cart))
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

fn checkout_error_message(code: &str) -> &'static str {
    match code {
        "empty" => "Your cart is empty.",
        _ => "Checkout is unavailable right now. Please try again.",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
///
/// Uses the session snapshot when it is fresh and refreshes it otherwise.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CartQuery>,
) -> Result<Response> {
    let caller = caller_for(&session, user.as_ref()).await?;
    let mut context = CartContext::load(&session).await?;
    let mut error = query.error.as_deref().map(|c| checkout_error_message(c).to_string());

    if context.is_stale(Utc::now(), state.config().cart_freshness) {
        match state.api().get_cart(&caller).await {
            Ok(cart) => {
                context.record(cart, Utc::now());
                context.save(&session).await?;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch cart: {e}");
                error.get_or_insert_with(|| e.user_message());
            }
        }
    }

    let cart = context.cart().map_or_else(CartView::empty, CartView::from);
    let nav = NavView::load(&state, &session, user.as_ref()).await;

    Ok(CartShowTemplate { nav, cart, error }.into_response())
}

/// Add item to cart.
///
/// HTMX requests get the new badge and a `cart-updated` trigger; plain form
/// posts are redirected to the cart page.
#[instrument(skip(state, session, user, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let caller = caller_for(&session, user.as_ref()).await?;
    let quantity = form.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY);
    let product_id = ProductId::new(form.product_id);

    match state.api().add_to_cart(&caller, &product_id, quantity).await {
        Ok(cart) => {
            let view = store_cart(&session, &cart).await?;
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product_id.as_str())]),
            );

            if is_htmx(&headers) {
                Ok((
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate {
                        count: view.item_count,
                    },
                )
                    .into_response())
            } else {
                Ok(Redirect::to("/cart").into_response())
            }
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            let message = e.user_message();
            let status = AppError::from(e).status();
            Ok((status, CartErrorTemplate { message }).into_response())
        }
    }
}

/// Update cart item quantity (HTMX). A quantity of zero removes the line.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let caller = caller_for(&session, user.as_ref()).await?;
    let item_id = CartItemId::new(form.item_id);

    let result = if form.quantity == 0 {
        remove_and_reload(&state, &caller, &item_id).await
    } else {
        state
            .api()
            .update_cart_item(&caller, &item_id, form.quantity.min(MAX_LINE_QUANTITY))
            .await
    };

    cart_items_response(&session, result).await
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let caller = caller_for(&session, user.as_ref()).await?;
    let result = remove_and_reload(&state, &caller, &CartItemId::new(form.item_id)).await;
    cart_items_response(&session, result).await
}

async fn remove_and_reload(
    state: &AppState,
    caller: &Caller,
    item_id: &CartItemId,
) -> crate::api::ApiResult<Cart> {
    state.api().remove_cart_item(caller, item_id).await?;
    state.api().get_cart(caller).await
}

async fn cart_items_response(
    session: &Session,
    result: crate::api::ApiResult<Cart>,
) -> Result<Response> {
    match result {
        Ok(cart) => {
            let view = store_cart(session, &cart).await?;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate {
                    cart: view,
                    error: None,
                },
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!("Failed to change cart: {e}");
            // Show the last known cart with the error above it.
            let context = CartContext::load(session).await?;
            Ok(CartItemsTemplate {
                cart: context.cart().map_or_else(CartView::empty, CartView::from),
                error: Some(e.user_message()),
            }
            .into_response())
        }
    }
}

/// Get cart count badge (HTMX). Reads the session snapshot only.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let count = CartContext::load(&session)
        .await
        .map(|context| context.item_count())
        .unwrap_or(0);

    CartCountTemplate { count }
}

/// Open the mini-cart (HTMX). Hits the backend only when the snapshot is stale.
#[instrument(skip(state, session, user))]
pub async fn mini_open(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let caller = caller_for(&session, user.as_ref()).await?;
    let mut gate = session
        .get::<MiniCartGate>(session_keys::MINI_CART)
        .await?
        .unwrap_or_default();
    let mut context = CartContext::load(&session).await?;

    let source = ApiCartSource::new(state.api(), &caller);
    let outcome = open_mini_cart(
        &mut gate,
        &mut context,
        &source,
        user.is_some(),
        state.config().cart_freshness,
        Utc::now(),
    )
    .await;

    session.insert(session_keys::MINI_CART, gate).await?;
    let error = match outcome {
        MiniCartOutcome::Loaded => {
            context.save(&session).await?;
            None
        }
        MiniCartOutcome::Unchanged => None,
        MiniCartOutcome::Failed(message) => Some(message),
    };

    Ok(MiniCartTemplate {
        cart: context.cart().map_or_else(CartView::empty, CartView::from),
        error,
    }
    .into_response())
}

/// Close the mini-cart (HTMX). Never calls the backend.
#[instrument(skip(session))]
pub async fn mini_close(session: Session) -> Result<Response> {
    let mut gate = session
        .get::<MiniCartGate>(session_keys::MINI_CART)
        .await?
        .unwrap_or_default();
    gate.close();
    session.insert(session_keys::MINI_CART, gate).await?;
    Ok(Html(String::new()).into_response())
}

/// Start checkout and redirect to the backend-provided checkout URL.
#[instrument(skip(state, session, user))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let context = CartContext::load(&session).await?;
    if context.cart().is_some_and(Cart::is_empty) {
        return Ok(Redirect::to("/cart?error=empty").into_response());
    }

    let caller = caller_for(&session, user.as_ref()).await?;
    match state.api().checkout(&caller).await {
        Ok(checkout) => {
            invalidate_cart(&session).await?;
            Ok(Redirect::to(&checkout.checkout_url).into_response())
        }
        Err(e) => {
            tracing::error!("Failed to start checkout: {e}");
            Ok(Redirect::to("/cart?error=checkout").into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_is_escaped() {
        let html = CartErrorTemplate {
            message: "<b>Tom's</b> \"mug\" & more".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.starts_with("<span class=\"cart-error\""));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("Tom's"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&amp; more"));
    }

    #[test]
    fn test_checkout_error_messages() {
        assert_eq!(checkout_error_message("empty"), "Your cart is empty.");
        assert!(checkout_error_message("anything").contains("try again"));
    }
}
