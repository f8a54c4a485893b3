//! Orders and vendor-side status transitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::lenient;
use crate::types::{OrderId, OrderStatus, PaymentStatus, ProductId};

/// A line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "lenient")]
    pub price: Decimal,
    pub quantity: u32,
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    /// Single-line rendering for tables.
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            Some(self.full_name.as_str()),
            Some(self.line1.as_str()),
            self.line2.as_deref(),
            Some(self.city.as_str()),
            self.state.as_deref(),
            Some(self.postal_code.as_str()),
            Some(self.country.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A customer order as seen by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(with = "lenient", default)]
    pub total: Decimal,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move an order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    /// Statuses a vendor may move an order to from `self`.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether no further changes are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }

    /// Validate a vendor-initiated status change.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `to` is not reachable from `self`.
    pub fn transition_to(self, to: Self) -> Result<Self, TransitionError> {
        if self.next_statuses().contains(&to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}
