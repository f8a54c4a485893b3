//! Products and the vendor-side product form payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::money::{lenient, lenient_option};
use crate::types::{CategoryId, ProductId, ProductStatus, VendorId};

/// Inventory at or below this level is flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A marketplace product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "lenient")]
    pub price: Decimal,
    #[serde(with = "lenient_option", default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub vendor_id: VendorId,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub inventory: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub status: ProductStatus,
    /// Image URLs; the first one is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The primary image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether a sale price below the list price applies.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some_and(|sale| sale < self.price)
    }

    /// Price a customer pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if sale < self.price => sale,
            _ => self.price,
        }
    }

    /// Whole-percent discount when on sale, rounded down.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        if !self.is_on_sale() || self.price.is_zero() {
            return None;
        }
        let off = (self.price - self.effective_price()) * Decimal::from(100) / self.price;
        off.floor().to_u32()
    }

    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.inventory > 0
    }

    /// Whether inventory is at or below [`LOW_STOCK_THRESHOLD`].
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.inventory <= LOW_STOCK_THRESHOLD
    }
}

/// Fields a vendor submits to create or update a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    #[serde(with = "lenient")]
    pub price: Decimal,
    #[serde(with = "lenient_option")]
    pub sale_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub inventory: u32,
    pub is_active: bool,
    pub images: Vec<String>,
}

/// Validation failures for a [`ProductDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductDraftError {
    #[error("product name is required")]
    MissingName,
    #[error("product name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("sale price must be lower than the regular price")]
    SalePriceNotLower,
    #[error("a category is required")]
    MissingCategory,
}

impl ProductDraft {
    /// Maximum product name length.
    pub const MAX_NAME_LENGTH: usize = 200;

    /// Check the draft before sending it to the backend.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft breaks.
    pub fn validate(&self) -> Result<(), ProductDraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductDraftError::MissingName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(ProductDraftError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }
        if self.price <= Decimal::ZERO {
            return Err(ProductDraftError::NonPositivePrice);
        }
        if self.sale_price.is_some_and(|sale| sale >= self.price) {
            return Err(ProductDraftError::SalePriceNotLower);
        }
        if self.category_id.is_none() {
            return Err(ProductDraftError::MissingCategory);
        }
        Ok(())
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            sale_price: product.sale_price,
            category_id: product.category_id.clone(),
            inventory: product.inventory,
            is_active: product.is_active,
            images: product.images.clone(),
        }
    }
}
