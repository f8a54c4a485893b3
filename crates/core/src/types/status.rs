//! Status enums for marketplace entities.
//!
//! Wire values are lowercase snake case. Every enum round-trips through
//! `Display`/`FromStr` so the same strings can be used in query parameters and
//! form fields.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownStatus {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, $label:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownStatus {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Product moderation and visibility status.
    ProductStatus ("product status") {
        /// Awaiting admin review.
        #[default]
        Pending => "pending", "Pending";
        /// Approved by an admin, not yet activated by the vendor.
        Approved => "approved", "Approved";
        /// Rejected by an admin.
        Rejected => "rejected", "Rejected";
        /// Visible in the storefront.
        Active => "active", "Active";
        /// Hidden by the vendor.
        Inactive => "inactive", "Inactive";
    }
}

wire_enum! {
    /// Order fulfillment status.
    OrderStatus ("order status") {
        #[default]
        Pending => "pending", "Pending";
        Processing => "processing", "Processing";
        Shipped => "shipped", "Shipped";
        Delivered => "delivered", "Delivered";
        Cancelled => "cancelled", "Cancelled";
    }
}

wire_enum! {
    /// Order payment status.
    PaymentStatus ("payment status") {
        #[default]
        Pending => "pending", "Pending";
        Paid => "paid", "Paid";
        Failed => "failed", "Failed";
        Refunded => "refunded", "Refunded";
    }
}

wire_enum! {
    /// Approval state of a category. Vendors may propose categories that an
    /// admin must approve before they appear in the storefront.
    CategoryStatus ("category status") {
        Pending => "pending", "Pending";
        #[default]
        Approved => "approved", "Approved";
        Rejected => "rejected", "Rejected";
    }
}

wire_enum! {
    /// Role of a signed-in user.
    UserRole ("user role") {
        #[default]
        Customer => "customer", "Customer";
        Vendor => "vendor", "Vendor";
        Admin => "admin", "Admin";
    }
}

impl ProductStatus {
    /// Whether customers can see a product in this status.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Active | Self::Approved)
    }
}
