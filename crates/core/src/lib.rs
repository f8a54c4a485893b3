//! Bazaar Core - domain types and pure client logic.
//!
//! Shared by the `storefront` crate and its integration tests. Everything here
//! is synchronous and side-effect free: no HTTP, no session store, no clock.
//!
//! # Modules
//!
//! - [`types`] - typed ids, money helpers and status enums
//! - [`category`] - category tree and menu construction
//! - [`product`], [`cart`], [`order`], [`store`], [`analytics`] - backend records
//! - [`listing`] - page/filter/selection state and bulk action results
//! - [`filters`] - the filter of each list page
//! - [`mini_cart`] - the mini-cart fetch gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod cart;
pub mod category;
pub mod filters;
pub mod listing;
pub mod mini_cart;
pub mod order;
pub mod product;
pub mod store;
pub mod types;

pub use cart::{Cart, CartItem, GuestCartStatus};
pub use category::{Category, CategoryMenu, CategoryNode, build_category_tree};
pub use filters::{ModerationFilter, OrderFilter, ProductFilter, VendorProductFilter};
pub use listing::{
    BulkAction, BulkOutcome, ListChange, ListFilter, ListQuery, ListState, Pagination, Selection,
    apply_bulk_outcome,
};
pub use mini_cart::{GuestCheck, GuestFollowUp, MiniCartGate, OpenPlan};
pub use order::{Order, OrderItem, ShippingAddress, TransitionError};
pub use product::{LOW_STOCK_THRESHOLD, Product, ProductDraft, ProductDraftError};
pub use store::StoreSettings;
pub use types::*;
