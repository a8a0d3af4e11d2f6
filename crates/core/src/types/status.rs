//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Error returned for an unknown status name or a disallowed transition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderStatusError {
    /// The input names no known status.
    #[error("invalid order status: {0}")]
    Unknown(String),
    /// The transition is not allowed by the lifecycle.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

/// Order lifecycle status.
///
/// Transitions are constrained to the lifecycle below; anything not listed
/// is rejected by [`OrderStatus::transition_to`].
///
/// ```text
/// pending ──> confirmed ──> shipped ──> delivered ──> completed
///    │            │            │            │
///    │            │            └──> failed  └──> returned
///    └────────────┴──> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    #[default]
    Pending,
    /// Confirmed and queued for fulfillment.
    Confirmed,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before shipment.
    Cancelled,
    /// Sent back after delivery.
    Returned,
    /// Fulfillment failed in transit.
    Failed,
    /// Closed out.
    Completed,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Returned,
        Self::Failed,
        Self::Completed,
    ];

    /// Canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
            Self::Failed => "failed",
            Self::Completed => "completed",
        }
    }

    /// Statuses reachable from this one.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered, Self::Failed],
            Self::Delivered => &[Self::Completed, Self::Returned],
            Self::Cancelled | Self::Returned | Self::Failed | Self::Completed => &[],
        }
    }

    /// Validate a transition to `to`.
    ///
    /// Re-asserting the current status is a no-op and always allowed.
    ///
    /// # Errors
    ///
    /// Returns `OrderStatusError::InvalidTransition` when the lifecycle does
    /// not permit the move.
    pub fn transition_to(self, to: Self) -> Result<Self, OrderStatusError> {
        if self == to || self.allowed_transitions().contains(&to) {
            Ok(to)
        } else {
            Err(OrderStatusError::InvalidTransition { from: self, to })
        }
    }

    /// True once no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderStatusError::Unknown(s.to_owned()))
    }
}

// SQLx support (with postgres feature): statuses are stored as TEXT.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!(matches!(
            "refunded".parse::<OrderStatus>(),
            Err(OrderStatusError::Unknown(_))
        ));
    }

    #[test]
    fn test_happy_path_transitions() {
        let status = OrderStatus::Pending
            .transition_to(OrderStatus::Confirmed)
            .and_then(|s| s.transition_to(OrderStatus::Shipped))
            .and_then(|s| s.transition_to(OrderStatus::Delivered))
            .and_then(|s| s.transition_to(OrderStatus::Completed))
            .expect("full lifecycle is valid");
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn test_reassert_current_status_is_noop() {
        assert_eq!(
            OrderStatus::Shipped.transition_to(OrderStatus::Shipped),
            Ok(OrderStatus::Shipped)
        );
    }

    #[test]
    fn test_delivered_cannot_follow_cancelled() {
        assert_eq!(
            OrderStatus::Cancelled.transition_to(OrderStatus::Delivered),
            Err(OrderStatusError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Delivered,
            })
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }
}
