//! Runs the mini-cart gate's plan against the backend.
//!
//! The gate in `bazaar_core::mini_cart` decides; this module performs the
//! calls, strictly one after the other, and writes the result into the
//! session's [`CartContext`].

use std::future::Future;
use std::time::Duration;

use bazaar_core::{Cart, GuestCartStatus, GuestCheck, GuestFollowUp, MiniCartGate, OpenPlan};
use chrono::{DateTime, Utc};

use super::cart_context::CartContext;
use crate::api::{ApiResult, Caller, MarketplaceClient};

/// Where the mini-cart gets its data.
pub trait CartSource {
    /// The cheap "does this guest have a cart" signal.
    fn guest_cart_status(&self) -> impl Future<Output = ApiResult<GuestCartStatus>> + Send;

    /// The full cart.
    fn full_cart(&self) -> impl Future<Output = ApiResult<Cart>> + Send;
}

/// [`CartSource`] backed by the marketplace API.
pub struct ApiCartSource<'a> {
    client: &'a MarketplaceClient,
    caller: &'a Caller,
}

impl<'a> ApiCartSource<'a> {
    #[must_use]
    pub const fn new(client: &'a MarketplaceClient, caller: &'a Caller) -> Self {
        Self { client, caller }
    }
}

impl CartSource for ApiCartSource<'_> {
    fn guest_cart_status(&self) -> impl Future<Output = ApiResult<GuestCartStatus>> + Send {
        self.client.guest_cart_status(self.caller)
    }

    fn full_cart(&self) -> impl Future<Output = ApiResult<Cart>> + Send {
        self.client.get_cart(self.caller)
    }
}

/// What opening the mini-cart did to the cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiniCartOutcome {
    /// No backend call was needed.
    Unchanged,
    /// The snapshot was refreshed.
    Loaded,
    /// The fetch failed; the old snapshot stays. Carries a visitor-safe message.
    Failed(String),
}

/// Open the mini-cart and bring the snapshot up to date if the gate asks for it.
pub async fn open_mini_cart<S: CartSource>(
    gate: &mut MiniCartGate,
    context: &mut CartContext,
    source: &S,
    authenticated: bool,
    freshness: Duration,
    now: DateTime<Utc>,
) -> MiniCartOutcome {
    let stale = context.is_stale(now, freshness);

    match gate.open(stale, authenticated) {
        OpenPlan::Skip => MiniCartOutcome::Unchanged,
        OpenPlan::FetchCart => fetch_full_cart(context, source, now).await,
        OpenPlan::CheckGuestCart => {
            let check = match source.guest_cart_status().await {
                Ok(status) if status.has_items() => GuestCheck::HasItems,
                Ok(_) => GuestCheck::Empty,
                Err(err) => {
                    tracing::warn!(error = %err, "Guest cart check failed, fetching full cart");
                    GuestCheck::Failed
                }
            };

            match gate.guest_check(check) {
                GuestFollowUp::FetchCart => fetch_full_cart(context, source, now).await,
                GuestFollowUp::UseEmptyCart => {
                    context.record(Cart::empty(), now);
                    MiniCartOutcome::Loaded
                }
            }
        }
    }
}

async fn fetch_full_cart<S: CartSource>(
    context: &mut CartContext,
    source: &S,
    now: DateTime<Utc>,
) -> MiniCartOutcome {
    match source.full_cart().await {
        Ok(cart) => {
            context.record(cart, now);
            MiniCartOutcome::Loaded
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load cart for mini-cart");
            MiniCartOutcome::Failed(err.user_message())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::api::ApiError;

    const FRESHNESS: Duration = Duration::from_secs(60);

    /// Counts calls and answers from canned results.
    struct FakeSource {
        guest: Result<GuestCartStatus, u16>,
        cart: Result<Cart, u16>,
        guest_calls: AtomicUsize,
        cart_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(guest: Result<GuestCartStatus, u16>, cart: Result<Cart, u16>) -> Self {
            Self {
                guest,
                cart,
                guest_calls: AtomicUsize::new(0),
                cart_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.guest_calls.load(Ordering::SeqCst),
                self.cart_calls.load(Ordering::SeqCst),
            )
        }
    }

    fn server_error(status: u16) -> ApiError {
        ApiError::Status {
            status,
            message: "unavailable".to_string(),
        }
    }

    impl CartSource for FakeSource {
        async fn guest_cart_status(&self) -> ApiResult<GuestCartStatus> {
            self.guest_calls.fetch_add(1, Ordering::SeqCst);
            self.guest.map_err(server_error)
        }

        async fn full_cart(&self) -> ApiResult<Cart> {
            self.cart_calls.fetch_add(1, Ordering::SeqCst);
            self.cart.clone().map_err(server_error)
        }
    }

    fn cart(items: u32) -> Cart {
        Cart {
            total_items: items,
            ..Cart::empty()
        }
    }

    fn empty_guest() -> GuestCartStatus {
        GuestCartStatus::default()
    }

    fn guest_with(items: u32) -> GuestCartStatus {
        GuestCartStatus {
            exists: true,
            total_items: items,
        }
    }

    #[tokio::test]
    async fn test_fresh_cart_makes_no_calls() {
        let source = FakeSource::new(Ok(guest_with(1)), Ok(cart(1)));
        let mut gate = MiniCartGate::default();
        let mut context = CartContext::default();
        let now = Utc::now();
        context.record(cart(4), now);

        let outcome =
            open_mini_cart(&mut gate, &mut context, &source, false, FRESHNESS, now).await;

        assert_eq!(outcome, MiniCartOutcome::Unchanged);
        assert_eq!(source.calls(), (0, 0));
        assert_eq!(context.item_count(), 4);
    }

    #[tokio::test]
    async fn test_stale_signed_in_fetches_once() {
        let source = FakeSource::new(Ok(empty_guest()), Ok(cart(2)));
        let mut gate = MiniCartGate::default();
        let mut context = CartContext::default();
        let now = Utc::now();

        let outcome = open_mini_cart(&mut gate, &mut context, &source, true, FRESHNESS, now).await;

        assert_eq!(outcome, MiniCartOutcome::Loaded);
        assert_eq!(source.calls(), (0, 1));
        assert_eq!(context.item_count(), 2);
        assert!(!context.is_stale(now, FRESHNESS));

        // A second open before closing does not fetch again.
        context.invalidate();
        let outcome = open_mini_cart(&mut gate, &mut context, &source, true, FRESHNESS, now).await;
        assert_eq!(outcome, MiniCartOutcome::Unchanged);
        assert_eq!(source.calls(), (0, 1));
    }

    #[tokio::test]
    async fn test_empty_guest_cart_checks_only() {
        let source = FakeSource::new(Ok(guest_with(0)), Ok(cart(9)));
        let mut gate = MiniCartGate::default();
        let mut context = CartContext::default();
        let now = Utc::now();

        let outcome =
            open_mini_cart(&mut gate, &mut context, &source, false, FRESHNESS, now).await;

        assert_eq!(outcome, MiniCartOutcome::Loaded);
        assert_eq!(source.calls(), (1, 0));
        assert_eq!(context.cart(), Some(&Cart::empty()));
        assert!(!context.is_stale(now, FRESHNESS));
    }

    #[tokio::test]
    async fn test_guest_cart_with_items_is_fetched() {
        let source = FakeSource::new(Ok(guest_with(3)), Ok(cart(3)));
        let mut gate = MiniCartGate::default();
        let mut context = CartContext::default();

        let outcome =
            open_mini_cart(&mut gate, &mut context, &source, false, FRESHNESS, Utc::now()).await;

        assert_eq!(outcome, MiniCartOutcome::Loaded);
        assert_eq!(source.calls(), (1, 1));
        assert_eq!(context.item_count(), 3);
    }

    #[tokio::test]
    async fn test_guest_check_error_falls_back_to_fetch() {
        let source = FakeSource::new(Err(503), Ok(cart(1)));
        let mut gate = MiniCartGate::default();
        let mut context = CartContext::default();

        let outcome =
            open_mini_cart(&mut gate, &mut context, &source, false, FRESHNESS, Utc::now()).await;

        assert_eq!(outcome, MiniCartOutcome::Loaded);
        assert_eq!(source.calls(), (1, 1));
        assert_eq!(context.item_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_old_snapshot() {
        let source = FakeSource::new(Ok(empty_guest()), Err(500));
        let mut gate = MiniCartGate::default();
        let mut context = CartContext::default();
        let earlier = Utc::now() - chrono::TimeDelta::minutes(5);
        context.record(cart(2), earlier);

        let outcome =
            open_mini_cart(&mut gate, &mut context, &source, true, FRESHNESS, Utc::now()).await;

        assert!(matches!(outcome, MiniCartOutcome::Failed(_)));
        assert_eq!(context.item_count(), 2);
        assert!(context.is_stale(Utc::now(), FRESHNESS));
    }
}
