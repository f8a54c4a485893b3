//! Filters for each list page.
//!
//! Filters deserialize straight from query strings and form posts, where an
//! unselected `<select>` arrives as an empty string and a status of `all`
//! means "no status filter". Both read as `None`.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::listing::ListFilter;
use crate::types::{OrderStatus, ProductStatus};

/// Sort orders the public product list accepts.
pub const PRODUCT_SORTS: &[(&str, &str)] = &[
    ("newest", "Newest"),
    ("price_asc", "Price: low to high"),
    ("price_desc", "Price: high to low"),
    ("name", "Name"),
];

/// Public product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "checkbox")]
    pub on_sale: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort: Option<String>,
}

impl ListFilter for ProductFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "category", self.category.as_ref());
        push_opt(&mut pairs, "search", self.search.as_ref());
        push_opt(&mut pairs, "min_price", self.min_price.as_ref());
        push_opt(&mut pairs, "max_price", self.max_price.as_ref());
        push_flag(&mut pairs, "on_sale", self.on_sale);
        push_flag(&mut pairs, "in_stock", self.in_stock);
        if let Some(sort) = self
            .sort
            .as_deref()
            .filter(|s| PRODUCT_SORTS.iter().any(|(key, _)| key == s))
        {
            pairs.push(("sort", sort.to_string()));
        }
        pairs
    }
}

/// Vendor's own products.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VendorProductFilter {
    #[serde(default, deserialize_with = "all_as_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub low_stock: bool,
}

impl ListFilter for VendorProductFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "status", self.status.as_ref());
        push_opt(&mut pairs, "category", self.category.as_ref());
        push_opt(&mut pairs, "search", self.search.as_ref());
        push_flag(&mut pairs, "low_stock", self.low_stock);
        pairs
    }
}

/// Vendor orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default, deserialize_with = "all_as_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
}

impl ListFilter for OrderFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "status", self.status.as_ref());
        push_opt(&mut pairs, "search", self.search.as_ref());
        pairs
    }
}

/// Admin product moderation. Defaults to the pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFilter {
    #[serde(default = "pending", deserialize_with = "all_as_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
}

#[allow(clippy::unnecessary_wraps)]
const fn pending() -> Option<ProductStatus> {
    Some(ProductStatus::Pending)
}

impl Default for ModerationFilter {
    fn default() -> Self {
        Self {
            status: pending(),
            vendor: None,
            category: None,
            search: None,
        }
    }
}

impl ListFilter for ModerationFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "status", self.status.as_ref());
        push_opt(&mut pairs, "vendor", self.vendor.as_ref());
        push_opt(&mut pairs, "category", self.category.as_ref());
        push_opt(&mut pairs, "search", self.search.as_ref());
        pairs
    }

    fn link_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.query_pairs();
        // A link without a status would read back as pending.
        if self.status.is_none() {
            pairs.insert(0, ("status", "all".to_string()));
        }
        pairs
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn push_opt<T: Display>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&T>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

fn push_flag(pairs: &mut Vec<(&'static str, String)>, key: &'static str, on: bool) {
    if on {
        pairs.push((key, "true".to_string()));
    }
}

fn parse_trimmed<T>(raw: Option<&str>, none_values: &[&str]) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.map(str::trim) {
        None => Ok(None),
        Some(s) if s.is_empty() || none_values.contains(&s) => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|e: T::Err| e.to_string()),
    }
}

/// Read an optional value from a string, treating blanks as `None`.
///
/// # Errors
///
/// Fails when a non-blank value does not parse.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    parse_trimmed(raw.as_deref(), &[]).map_err(serde::de::Error::custom)
}

/// Like [`empty_as_none`], and `all` also means `None`.
///
/// # Errors
///
/// Fails when a non-blank value does not parse.
pub fn all_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    parse_trimmed(raw.as_deref(), &["all"]).map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

/// HTML checkbox: present as `on`, `true` or `1`. JSON booleans are read as is
/// so filters round-trip through the session store.
///
/// # Errors
///
/// Fails if the input is neither a boolean nor a string.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(on)) => on,
        Some(Flag::Text(text)) => matches!(text.as_str(), "on" | "true" | "1"),
        None => false,
    })
}
