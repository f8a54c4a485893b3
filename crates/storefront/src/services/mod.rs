//! Per-visitor workflows that sit between route handlers and the API client.
//!
//! # Services
//!
//! - `cart_context` - the session's cart snapshot and its staleness
//! - `mini_cart` - executes the mini-cart gate's plan against the backend
//! - `listing` - list page state persisted per list in the session
//! - `bulk` - concurrent per-row bulk mutations

pub mod bulk;
pub mod cart_context;
pub mod listing;
pub mod mini_cart;

pub use bulk::run_bulk;
pub use cart_context::CartContext;
pub use listing::{load_list, resolve_list, save_list};
pub use mini_cart::{ApiCartSource, CartSource, MiniCartOutcome, open_mini_cart};
