//! Status enums and their transition tables.
//!
//! Order and review statuses are closed enums. Every status change goes
//! through [`OrderStatus::can_transition_to`] or
//! [`ReviewStatus::can_transition_to`]; anything outside the table is
//! rejected at the API boundary.

use serde::{Deserialize, Serialize};

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    User,
    /// Staff with access to the moderation endpoints.
    Admin,
}

impl UserRole {
    /// Whether this role may call admin endpoints.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Order lifecycle status.
///
/// An order is created when a payment intent is requested and only becomes
/// `Confirmed` after the gateway signature verifies. Fulfilment then moves
/// it forward; `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment intent issued, awaiting verification.
    #[default]
    Created,
    /// Payment verified.
    Confirmed,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Abandoned or refunded before shipment.
    Cancelled,
}

impl OrderStatus {
    /// Transition table: `Created -> Confirmed -> Shipped -> Delivered`,
    /// with cancellation allowed until the order ships.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Review moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting moderation.
    #[default]
    Pending,
    /// Visible on the product page.
    Approved,
    /// Hidden from the product page.
    Rejected,
}

impl ReviewStatus {
    /// Transition table: pending reviews can be approved or rejected, and a
    /// moderation decision can be reversed later. Nothing returns to pending.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending | Self::Rejected, Self::Approved)
                | (Self::Pending | Self::Approved, Self::Rejected)
        )
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid review status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_forward_path() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_cancellation_window() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_no_backwards_or_skips() {
        assert!(!OrderStatus::Created.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Created));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn test_order_self_transition_rejected() {
        for s in [
            OrderStatus::Created,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!s.can_transition_to(s), "{s} -> {s} must be rejected");
        }
    }

    #[test]
    fn test_order_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Created.is_terminal());
    }

    #[test]
    fn test_order_status_parse_display_roundtrip() {
        for s in ["created", "confirmed", "shipped", "delivered", "cancelled"] {
            let parsed: OrderStatus = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("CONFIRMED".parse::<OrderStatus>().is_err());
        assert!("paid".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_review_moderation_transitions() {
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Approved));
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Rejected));
        assert!(ReviewStatus::Approved.can_transition_to(ReviewStatus::Rejected));
        assert!(ReviewStatus::Rejected.can_transition_to(ReviewStatus::Approved));
        assert!(!ReviewStatus::Approved.can_transition_to(ReviewStatus::Pending));
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::Pending));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("user".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("superuser".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(
            serde_json::to_string(&ReviewStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
