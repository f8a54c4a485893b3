//! Public catalog reads: products and categories.

use std::sync::Arc;

use bazaar_core::{Category, ListQuery, Product, ProductFilter, ProductId};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::client::segment;
use super::{ApiResult, Caller, Envelope, MarketplaceClient, Paginated};

impl MarketplaceClient {
    /// One page of public products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, query), fields(page = query.page))]
    pub async fn list_products(
        &self,
        query: &ListQuery<ProductFilter>,
    ) -> ApiResult<Paginated<Product>> {
        self.get("products", &Caller::anonymous(), &query.query_pairs())
            .await
    }

    /// Featured products for the home page. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> ApiResult<Arc<Vec<Product>>> {
        if let Some(CacheValue::Products(products)) =
            self.cache().get(&CacheKey::FeaturedProducts).await
        {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let envelope: Envelope<Vec<Product>> = self
            .get("products/featured", &Caller::anonymous(), &[])
            .await?;
        let products = Arc::new(envelope.data);

        self.cache()
            .insert(
                CacheKey::FeaturedProducts,
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;

        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or another error if the
    /// API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> ApiResult<Product> {
        let envelope: Envelope<Product> = self
            .get(
                &format!("products/{}", segment(id.as_str())),
                &Caller::anonymous(),
                &[],
            )
            .await?;
        Ok(envelope.data)
    }

    /// Every public category as a flat list. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> ApiResult<Arc<Vec<Category>>> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache().get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let envelope: Envelope<Vec<Category>> =
            self.get("categories", &Caller::anonymous(), &[]).await?;
        let categories = Arc::new(envelope.data);

        self.cache()
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    /// Drop the cached category list after an admin change.
    pub async fn invalidate_categories(&self) {
        self.cache().invalidate(&CacheKey::Categories).await;
    }
}
