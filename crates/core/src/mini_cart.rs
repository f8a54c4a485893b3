//! Open/close state of the header mini-cart and its fetch gate.
//!
//! Opening the mini-cart must not hit the backend when the cached cart is
//! still fresh, and the check runs at most once per open: it is re-armed only
//! when the mini-cart closes. When the cart is stale, signed-in users always
//! fetch their cart; guests first ask the cheap guest-cart endpoint and only
//! fetch when a guest cart with items exists.
//!
//! This module decides *what* to do. Performing the calls is up to the
//! caller, which then reports back through [`MiniCartGate::guest_check`].

use serde::{Deserialize, Serialize};

/// What the caller must do after the mini-cart opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenPlan {
    /// The cached cart is fresh; no network.
    Skip,
    /// Fetch the full cart.
    FetchCart,
    /// Ask whether a guest cart exists, then continue with [`GuestCheck`].
    CheckGuestCart,
}

/// Result of the guest-cart existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestCheck {
    /// A guest cart with at least one item exists.
    HasItems,
    /// No guest cart, or an empty one.
    Empty,
    /// The check itself failed.
    Failed,
}

/// Follow-up after a guest check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestFollowUp {
    /// Fetch the full cart.
    FetchCart,
    /// Record an empty cart as the fresh snapshot.
    UseEmptyCart,
}

/// Per-visitor mini-cart state, persisted in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MiniCartGate {
    is_open: bool,
    checked: bool,
}

impl MiniCartGate {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the freshness check already ran since the last close.
    #[must_use]
    pub const fn checked(&self) -> bool {
        self.checked
    }

    /// Open the mini-cart and decide whether to load anything.
    ///
    /// `stale` reports the cart snapshot's freshness at the moment of opening.
    pub fn open(&mut self, stale: bool, authenticated: bool) -> OpenPlan {
        self.is_open = true;
        if self.checked {
            return OpenPlan::Skip;
        }
        self.checked = true;
        match (stale, authenticated) {
            (false, _) => OpenPlan::Skip,
            (true, true) => OpenPlan::FetchCart,
            (true, false) => OpenPlan::CheckGuestCart,
        }
    }

    /// Continue after [`OpenPlan::CheckGuestCart`].
    ///
    /// A failed check still fetches the cart so a transient error on the cheap
    /// endpoint never hides a real cart.
    #[must_use]
    pub const fn guest_check(&self, check: GuestCheck) -> GuestFollowUp {
        match check {
            GuestCheck::HasItems | GuestCheck::Failed => GuestFollowUp::FetchCart,
            GuestCheck::Empty => GuestFollowUp::UseEmptyCart,
        }
    }

    /// Close the mini-cart and re-arm the check. Never touches the network.
    pub fn close(&mut self) {
        self.is_open = false;
        self.checked = false;
    }

    /// Open when closed, close when open. Returns the plan on open.
    pub fn toggle(&mut self, stale: bool, authenticated: bool) -> Option<OpenPlan> {
        if self.is_open {
            self.close();
            None
        } else {
            Some(self.open(stale, authenticated))
        }
    }
}
