//! The visitor's cart snapshot.
//!
//! The header badge, cart page and mini-cart all read this snapshot instead of
//! asking the backend on every page view. It goes stale after the configured
//! freshness window, or right away when login, logout or checkout changes whose
//! cart it is.

use std::time::Duration;

use bazaar_core::Cart;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Session-stored cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartContext {
    cart: Option<Cart>,
    fetched_at: Option<DateTime<Utc>>,
    invalidated: bool,
}

impl CartContext {
    /// Load the snapshot, or an empty (stale) one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        Ok(session
            .get::<Self>(session_keys::CART_CONTEXT)
            .await?
            .unwrap_or_default())
    }

    /// Persist the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::CART_CONTEXT, self).await
    }

    /// The cached cart, if one was ever loaded.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Whether the snapshot must be refreshed before it is trusted.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        if self.invalidated || self.cart.is_none() {
            return true;
        }
        let Some(fetched_at) = self.fetched_at else {
            return true;
        };
        let window = TimeDelta::from_std(freshness).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(fetched_at) >= window
    }

    /// Store a cart the backend just returned and mark it fresh.
    pub fn record(&mut self, cart: Cart, now: DateTime<Utc>) {
        self.cart = Some(cart);
        self.fetched_at = Some(now);
        self.invalidated = false;
    }

    /// Force the next read to go to the backend. The old cart stays visible
    /// until then.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// Badge count; zero when nothing is loaded.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, |cart| cart.total_items)
    }
}

/// Mark the stored snapshot stale, e.g. when the cart owner changes.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn invalidate_cart(session: &Session) -> Result<(), tower_sessions::session::Error> {
    let mut context = CartContext::load(session).await?;
    context.invalidate();
    context.save(session).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap_or_default()
    }

    fn cart(items: u32) -> Cart {
        Cart {
            total_items: items,
            ..Cart::empty()
        }
    }

    const FRESHNESS: Duration = Duration::from_secs(60);

    #[test]
    fn test_empty_context_is_stale() {
        let context = CartContext::default();
        assert!(context.is_stale(at(0), FRESHNESS));
        assert_eq!(context.item_count(), 0);
    }

    #[test]
    fn test_recorded_cart_is_fresh_until_window_passes() {
        let mut context = CartContext::default();
        context.record(cart(2), at(0));
        assert!(!context.is_stale(at(59), FRESHNESS));
        assert!(context.is_stale(at(60), FRESHNESS));
        assert_eq!(context.item_count(), 2);
    }

    #[test]
    fn test_invalidate_keeps_cart_but_marks_stale() {
        let mut context = CartContext::default();
        context.record(cart(1), at(0));
        context.invalidate();
        assert!(context.is_stale(at(1), FRESHNESS));
        assert_eq!(context.item_count(), 1);

        context.record(cart(3), at(2));
        assert!(!context.is_stale(at(3), FRESHNESS));
    }
}
