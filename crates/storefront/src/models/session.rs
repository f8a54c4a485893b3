//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in the session:
//! who they are, their guest id, the cart snapshot, the mini-cart gate and the
//! state of each list page.

use bazaar_core::{UserId, UserRole, VendorId};
use serde::{Deserialize, Serialize};

use crate::api::Caller;
use crate::api::auth::LoginResponse;

/// Session-stored user identity and backend token.
///
/// `Debug` redacts the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub vendor_id: Option<VendorId>,
    /// Bearer token for the marketplace API.
    pub token: String,
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("vendor_id", &self.vendor_id)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CurrentUser {
    /// Name for the header, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.role == UserRole::Vendor
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// API credentials for this user.
    #[must_use]
    pub fn caller(&self) -> Caller {
        Caller::user(self.token.clone())
    }
}

impl From<LoginResponse> for CurrentUser {
    fn from(login: LoginResponse) -> Self {
        Self {
            id: login.user.id,
            email: login.user.email,
            name: login.user.name,
            role: login.user.role,
            vendor_id: login.user.vendor_id,
            token: login.token,
        }
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Anonymous visitor id sent as `X-Guest-Id`.
    pub const GUEST_ID: &str = "guest_id";

    /// Cart snapshot and freshness.
    pub const CART_CONTEXT: &str = "cart_context";

    /// Mini-cart open/checked flags.
    pub const MINI_CART: &str = "mini_cart";

    /// Public product list state.
    pub const LIST_PRODUCTS: &str = "list:products";

    /// Vendor product list state.
    pub const LIST_VENDOR_PRODUCTS: &str = "list:vendor_products";

    /// Vendor order list state.
    pub const LIST_VENDOR_ORDERS: &str = "list:vendor_orders";

    /// Admin moderation list state.
    pub const LIST_ADMIN_PRODUCTS: &str = "list:admin_products";
}
