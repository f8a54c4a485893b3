//! Cart endpoints. Never cached: the cart is mutable per visitor.

use bazaar_core::{Cart, CartItemId, GuestCartStatus, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::client::segment;
use super::{ApiResult, Caller, Envelope, MarketplaceClient};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct QuantityRequest {
    quantity: u32,
}

/// Where to send the visitor to pay.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_url: String,
}

impl MarketplaceClient {
    /// The caller's full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn get_cart(&self, caller: &Caller) -> ApiResult<Cart> {
        let envelope: Envelope<Cart> = self.get("cart", caller, &[]).await?;
        Ok(envelope.data)
    }

    /// Whether the guest has a cart worth fetching.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn guest_cart_status(&self, caller: &Caller) -> ApiResult<GuestCartStatus> {
        let envelope: Envelope<GuestCartStatus> = self.get("cart/guest", caller, &[]).await?;
        Ok(envelope.data)
    }

    /// Add a product; returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        caller: &Caller,
        product_id: &ProductId,
        quantity: u32,
    ) -> ApiResult<Cart> {
        let envelope: Envelope<Cart> = self
            .post(
                "cart/items",
                caller,
                &AddItemRequest {
                    product_id,
                    quantity,
                },
            )
            .await?;
        Ok(envelope.data)
    }

    /// Change a line's quantity; returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        caller: &Caller,
        item_id: &CartItemId,
        quantity: u32,
    ) -> ApiResult<Cart> {
        let envelope: Envelope<Cart> = self
            .patch(
                &format!("cart/items/{}", segment(item_id.as_str())),
                caller,
                &QuantityRequest { quantity },
            )
            .await?;
        Ok(envelope.data)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, caller: &Caller, item_id: &CartItemId) -> ApiResult<()> {
        self.delete(&format!("cart/items/{}", segment(item_id.as_str())), caller)
            .await
    }

    /// Start checkout for the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn checkout(&self, caller: &Caller) -> ApiResult<CheckoutSession> {
        let envelope: Envelope<CheckoutSession> =
            self.post("cart/checkout", caller, &serde_json::json!({})).await?;
        Ok(envelope.data)
    }
}
