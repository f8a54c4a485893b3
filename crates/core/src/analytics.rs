//! Vendor sales analytics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;
use crate::types::money::lenient;

/// Best-selling product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub units_sold: u32,
    #[serde(with = "lenient")]
    pub revenue: Decimal,
}

/// Revenue for one calendar month, `month` formatted `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub month: String,
    pub orders: u32,
    #[serde(with = "lenient")]
    pub revenue: Decimal,
}

/// Dashboard summary for a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorAnalytics {
    #[serde(with = "lenient", default)]
    pub total_revenue: Decimal,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub total_products: u32,
    #[serde(default)]
    pub pending_orders: u32,
    #[serde(default)]
    pub low_stock_products: u32,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
    #[serde(default)]
    pub monthly_sales: Vec<MonthlySales>,
}

impl VendorAnalytics {
    /// Mean order value, `None` without orders.
    #[must_use]
    pub fn average_order_value(&self) -> Option<Decimal> {
        if self.total_orders == 0 {
            None
        } else {
            Some((self.total_revenue / Decimal::from(self.total_orders)).round_dp(2))
        }
    }

    /// Month-over-month revenue change of the last two months, in percent.
    #[must_use]
    pub fn revenue_trend_percent(&self) -> Option<Decimal> {
        let [.., previous, latest] = self.monthly_sales.as_slice() else {
            return None;
        };
        if previous.revenue.is_zero() {
            return None;
        }
        Some(((latest.revenue - previous.revenue) * Decimal::from(100) / previous.revenue).round_dp(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_derived_figures() {
        let analytics: VendorAnalytics = serde_json::from_str(
            r#"{
                "totalRevenue": "300.00", "totalOrders": 4,
                "monthlySales": [
                    {"month": "2024-04", "orders": 1, "revenue": "100"},
                    {"month": "2024-05", "orders": 3, "revenue": "150"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            analytics.average_order_value(),
            Decimal::from_str("75.00").ok()
        );
        assert_eq!(
            analytics.revenue_trend_percent(),
            Decimal::from_str("50.0").ok()
        );
    }

    #[test]
    fn test_empty_analytics() {
        let analytics = VendorAnalytics::default();
        assert_eq!(analytics.average_order_value(), None);
        assert_eq!(analytics.revenue_trend_percent(), None);
    }
}
