//! Vendor storefront management endpoints.

use bazaar_core::analytics::VendorAnalytics;
use bazaar_core::{
    BulkAction, ListQuery, Order, OrderFilter, OrderId, OrderStatus, Product, ProductDraft,
    ProductId, StoreSettings, VendorProductFilter,
};
use serde::{Deserialize, Serialize};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::client::segment;
use super::{ApiError, ApiResult, Caller, Envelope, MarketplaceClient, Paginated};

/// One row of an inventory batch update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub product_id: ProductId,
    pub inventory: u32,
}

#[derive(Serialize)]
struct InventoryBatch<'a> {
    items: &'a [InventoryUpdate],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveRequest {
    is_active: bool,
}

#[derive(Serialize)]
struct OrderStatusRequest {
    status: OrderStatus,
}

fn product_path(id: &ProductId) -> String {
    format!("vendor/products/{}", segment(id.as_str()))
}

fn order_path(id: &OrderId) -> String {
    format!("vendor/orders/{}", segment(id.as_str()))
}

impl MarketplaceClient {
    /// One page of the vendor's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, query), fields(page = query.page))]
    pub async fn vendor_products(
        &self,
        caller: &Caller,
        query: &ListQuery<VendorProductFilter>,
    ) -> ApiResult<Paginated<Product>> {
        self.get("vendor/products", caller, &query.query_pairs())
            .await
    }

    /// Every product of the vendor, for the inventory table.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn vendor_inventory(&self, caller: &Caller) -> ApiResult<Vec<Product>> {
        let page: Paginated<Product> = self
            .get("vendor/products", caller, &[("limit", "500".to_string())])
            .await?;
        Ok(page.data)
    }

    /// A single product owned by the vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(product_id = %id))]
    pub async fn vendor_product(&self, caller: &Caller, id: &ProductId) -> ApiResult<Product> {
        let envelope: Envelope<Product> = self.get(&product_path(id), caller, &[]).await?;
        Ok(envelope.data)
    }

    /// Create a product. New products start pending approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, caller: &Caller, draft: &ProductDraft) -> ApiResult<Product> {
        let envelope: Envelope<Product> = self.post("vendor/products", caller, draft).await?;
        Ok(envelope.data)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        caller: &Caller,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> ApiResult<Product> {
        let envelope: Envelope<Product> = self.put(&product_path(id), caller, draft).await?;
        Ok(envelope.data)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(product_id = %id))]
    pub async fn delete_product(&self, caller: &Caller, id: &ProductId) -> ApiResult<()> {
        self.delete(&product_path(id), caller).await
    }

    /// Activate or deactivate a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(product_id = %id))]
    pub async fn set_product_active(
        &self,
        caller: &Caller,
        id: &ProductId,
        is_active: bool,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .patch(
                &format!("{}/status", product_path(id)),
                caller,
                &ActiveRequest { is_active },
            )
            .await?;
        Ok(())
    }

    /// Run one bulk action on one of the vendor's products.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for moderation actions, which vendors
    /// cannot perform, or another error if the API request fails.
    pub async fn vendor_bulk_action(
        &self,
        caller: &Caller,
        id: &ProductId,
        action: BulkAction,
    ) -> ApiResult<()> {
        match action {
            BulkAction::Activate => self.set_product_active(caller, id, true).await,
            BulkAction::Deactivate => self.set_product_active(caller, id, false).await,
            BulkAction::Delete => self.delete_product(caller, id).await,
            BulkAction::Approve | BulkAction::Reject => Err(ApiError::Forbidden),
        }
    }

    /// Set inventory for several products in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, updates), fields(count = updates.len()))]
    pub async fn update_inventory(
        &self,
        caller: &Caller,
        updates: &[InventoryUpdate],
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .patch(
                "vendor/inventory/batch",
                caller,
                &InventoryBatch { items: updates },
            )
            .await?;
        Ok(())
    }

    /// One page of the vendor's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, query), fields(page = query.page))]
    pub async fn vendor_orders(
        &self,
        caller: &Caller,
        query: &ListQuery<OrderFilter>,
    ) -> ApiResult<Paginated<Order>> {
        self.get("vendor/orders", caller, &query.query_pairs()).await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(order_id = %id))]
    pub async fn vendor_order(&self, caller: &Caller, id: &OrderId) -> ApiResult<Order> {
        let envelope: Envelope<Order> = self.get(&order_path(id), caller, &[]).await?;
        Ok(envelope.data)
    }

    /// Move an order to a new status; returns the updated order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        caller: &Caller,
        id: &OrderId,
        status: OrderStatus,
    ) -> ApiResult<Order> {
        let envelope: Envelope<Order> = self
            .patch(
                &format!("{}/status", order_path(id)),
                caller,
                &OrderStatusRequest { status },
            )
            .await?;
        Ok(envelope.data)
    }

    /// Sales summary for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn vendor_analytics(&self, caller: &Caller) -> ApiResult<VendorAnalytics> {
        let envelope: Envelope<VendorAnalytics> =
            self.get("vendor/analytics", caller, &[]).await?;
        Ok(envelope.data)
    }

    /// The vendor's store settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn store_settings(&self, caller: &Caller) -> ApiResult<StoreSettings> {
        let envelope: Envelope<StoreSettings> = self.get("vendor/store", caller, &[]).await?;
        Ok(envelope.data)
    }

    /// Save store settings; returns what the backend stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, settings), fields(slug = %settings.slug))]
    pub async fn update_store_settings(
        &self,
        caller: &Caller,
        settings: &StoreSettings,
    ) -> ApiResult<StoreSettings> {
        let envelope: Envelope<StoreSettings> =
            self.put("vendor/store", caller, settings).await?;
        Ok(envelope.data)
    }
}
