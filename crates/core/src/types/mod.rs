//! Core types for the Bazaar marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{format_money, parse_money};
pub use status::*;
