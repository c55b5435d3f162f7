//! Status enums for orders, payments and users.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Orders move through a fixed lifecycle:
///
/// ```text
/// pending ──► processing ──► shipped ──► delivered
///    │             │
///    └──► cancelled ◄┘
/// ```
///
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Rejected order status change.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("order cannot move from {from} to {to}")]
pub struct StatusTransitionError {
    /// Status the order is currently in.
    pub from: OrderStatus,
    /// Status that was requested.
    pub to: OrderStatus,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire name used by the `orders.status` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable from this one in a single step.
    #[must_use]
    pub const fn next_statuses(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether `to` is a legal next status.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next_statuses().contains(&to)
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.next_statuses().is_empty()
    }

    /// Validate a transition, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError`] when `to` is not reachable from the
    /// current status. Re-applying the current status is also rejected.
    pub fn transition(self, to: Self) -> Result<Self, StatusTransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(StatusTransitionError { from: self, to })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// How the shopper pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery. Unpaid until an admin marks it paid.
    #[default]
    Cod,
    Razorpay,
    Stripe,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Cod, Self::Razorpay, Self::Stripe];

    /// Wire name used by the `orders.payment_method` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Razorpay => "razorpay",
            Self::Stripe => "stripe",
        }
    }

    /// Whether an order placed with this method starts out paid.
    #[must_use]
    pub const fn is_prepaid(&self) -> bool {
        !matches!(self, Self::Cod)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "razorpay" => Ok(Self::Razorpay),
            "stripe" => Ok(Self::Stripe),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Role stored on the `users` profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shopper. Older rows store this as `user`.
    #[default]
    #[serde(alias = "user")]
    Customer,
    /// Back-office access.
    Admin,
}

impl UserRole {
    /// Role granted to a newly created profile.
    ///
    /// The configured admin address gets [`UserRole::Admin`]; everyone else is
    /// a customer. An unset or empty admin address grants nobody admin.
    #[must_use]
    pub fn for_new_profile(email: &super::Email, admin_email: Option<&str>) -> Self {
        match admin_email {
            Some(admin) if !admin.trim().is_empty() && email.matches(admin) => Self::Admin,
            _ => Self::Customer,
        }
    }

    /// Wire name used by the `users.role` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Email;

    #[test]
    fn test_forward_lifecycle() {
        let status = OrderStatus::Pending
            .transition(OrderStatus::Processing)
            .and_then(|s| s.transition(OrderStatus::Shipped))
            .and_then(|s| s.transition(OrderStatus::Delivered))
            .unwrap();
        assert_eq!(status, OrderStatus::Delivered);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_cancellable_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_illegal_transitions_are_typed_errors() {
        let err = OrderStatus::Delivered
            .transition(OrderStatus::Pending)
            .unwrap_err();
        assert_eq!(
            err,
            StatusTransitionError {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            }
        );
        assert_eq!(err.to_string(), "order cannot move from delivered to pending");
    }

    #[test]
    fn test_self_transition_rejected() {
        for status in OrderStatus::ALL {
            assert!(status.transition(status).is_err());
        }
    }

    #[test]
    fn test_no_skipping_steps() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_status_round_trips_through_wire_name() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_prepaid() {
        assert!(!PaymentMethod::Cod.is_prepaid());
        assert!(PaymentMethod::Razorpay.is_prepaid());
        assert!(PaymentMethod::Stripe.is_prepaid());
        assert_eq!("COD".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
    }

    #[test]
    fn test_role_for_new_profile() {
        let admin = Email::parse("owner@shop.in").unwrap();
        let shopper = Email::parse("shopper@shop.in").unwrap();

        assert_eq!(
            UserRole::for_new_profile(&admin, Some("Owner@Shop.in")),
            UserRole::Admin
        );
        assert_eq!(
            UserRole::for_new_profile(&shopper, Some("owner@shop.in")),
            UserRole::Customer
        );
        assert_eq!(UserRole::for_new_profile(&admin, None), UserRole::Customer);
        assert_eq!(UserRole::for_new_profile(&admin, Some("")), UserRole::Customer);
    }

    #[test]
    fn test_role_accepts_legacy_user_value() {
        let role: UserRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, UserRole::Customer);
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }
}
