//! Shopping cart as returned by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::lenient;
use crate::types::{CartItemId, ProductId, VendorId};

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "lenient")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cart snapshot. Whether it is still current is tracked by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub total_items: u32,
    /// String-encoded decimal on the wire.
    #[serde(with = "lenient", default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The lightweight "does this guest have a cart" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartStatus {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub total_items: u32,
}

impl GuestCartStatus {
    /// A guest cart is worth fetching only when it exists and holds items.
    #[must_use]
    pub const fn has_items(&self) -> bool {
        self.exists && self.total_items > 0
    }
}
