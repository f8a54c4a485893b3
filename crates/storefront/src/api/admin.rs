//! Admin moderation endpoints.
//!
//! Category mutations drop the cached public category list.

use bazaar_core::{
    BulkAction, Category, CategoryId, ListQuery, ModerationFilter, Product, ProductId,
};
use serde::{Deserialize, Serialize};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::client::segment;
use super::{ApiError, ApiResult, Caller, Envelope, MarketplaceClient, Paginated};

/// Fields of a category create/update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            parent_id: category.parent_id.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
        }
    }
}

#[derive(Serialize)]
struct RejectRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

fn category_path(id: &CategoryId) -> String {
    format!("admin/categories/{}", segment(id.as_str()))
}

fn product_path(id: &ProductId) -> String {
    format!("admin/products/{}", segment(id.as_str()))
}

impl MarketplaceClient {
    /// One page of products for moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, query), fields(page = query.page))]
    pub async fn admin_products(
        &self,
        caller: &Caller,
        query: &ListQuery<ModerationFilter>,
    ) -> ApiResult<Paginated<Product>> {
        self.get("admin/products", caller, &query.query_pairs())
            .await
    }

    /// Approve a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(product_id = %id))]
    pub async fn approve_product(&self, caller: &Caller, id: &ProductId) -> ApiResult<()> {
        let _: IgnoredAny = self
            .patch(
                &format!("{}/approve", product_path(id)),
                caller,
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    /// Reject a product with an optional reason shown to the vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, reason), fields(product_id = %id))]
    pub async fn reject_product(
        &self,
        caller: &Caller,
        id: &ProductId,
        reason: Option<&str>,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .patch(
                &format!("{}/reject", product_path(id)),
                caller,
                &RejectRequest { reason },
            )
            .await?;
        Ok(())
    }

    /// Run one bulk moderation action on one product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for actions that are not moderation
    /// actions, or another error if the API request fails.
    pub async fn admin_bulk_action(
        &self,
        caller: &Caller,
        id: &ProductId,
        action: BulkAction,
    ) -> ApiResult<()> {
        match action {
            BulkAction::Approve => self.approve_product(caller, id).await,
            BulkAction::Reject => self.reject_product(caller, id, None).await,
            BulkAction::Activate | BulkAction::Deactivate | BulkAction::Delete => {
                Err(ApiError::Forbidden)
            }
        }
    }

    /// Every category regardless of approval state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller))]
    pub async fn admin_categories(&self, caller: &Caller) -> ApiResult<Vec<Category>> {
        let envelope: Envelope<Vec<Category>> =
            self.get("admin/categories", caller, &[]).await?;
        Ok(envelope.data)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        caller: &Caller,
        input: &CategoryInput,
    ) -> ApiResult<Category> {
        let envelope: Envelope<Category> = self.post("admin/categories", caller, input).await?;
        self.invalidate_categories().await;
        Ok(envelope.data)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        caller: &Caller,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> ApiResult<Category> {
        let envelope: Envelope<Category> = self.put(&category_path(id), caller, input).await?;
        self.invalidate_categories().await;
        Ok(envelope.data)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(category_id = %id))]
    pub async fn delete_category(&self, caller: &Caller, id: &CategoryId) -> ApiResult<()> {
        self.delete(&category_path(id), caller).await?;
        self.invalidate_categories().await;
        Ok(())
    }

    /// Approve or reject a vendor-proposed category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, caller), fields(category_id = %id))]
    pub async fn moderate_category(
        &self,
        caller: &Caller,
        id: &CategoryId,
        approve: bool,
    ) -> ApiResult<()> {
        let verb = if approve { "approve" } else { "reject" };
        let _: IgnoredAny = self
            .patch(
                &format!("{}/{verb}", category_path(id)),
                caller,
                &serde_json::json!({}),
            )
            .await?;
        self.invalidate_categories().await;
        Ok(())
    }
}
