//! # Order Status State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Allowed Transitions                                │
//! │                                                                         │
//! │        ┌─────┐  ship  ┌─────────┐  deliver  ┌───────────┐              │
//! │        │ NEW │───────►│ PENDING │──────────►│ DELIVERED │ (terminal)   │
//! │        └──┬──┘        └────┬────┘           └───────────┘              │
//! │           │                │                                            │
//! │           │   cancel       │ cancel                                     │
//! │           └───────►┌───────▼───┐                                        │
//! │                    │ CANCELLED │ (terminal)                             │
//! │                    └───────────┘                                        │
//! │                                                                         │
//! │  Anything not drawn above is illegal, including X → X.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, not yet shipped.
    #[default]
    New,
    /// Shipped, awaiting delivery.
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::Pending,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns true when `self → next` is an allowed transition.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::New, OrderStatus::Pending)
                | (OrderStatus::Pending, OrderStatus::Delivered)
                | (OrderStatus::New, OrderStatus::Cancelled)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    /// Terminal statuses admit no further transition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Statuses reachable from `self` in one step.
    pub fn next_statuses(self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the upper-case wire names, ignoring case.
impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown order status '{}'", s),
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_cannot_skip_pending() {
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_terminal_statuses_are_final() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(terminal.next_statuses().is_empty());
            for next in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_self_transition_is_illegal() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_no_way_back() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::New));
        assert_eq!(
            OrderStatus::New.next_statuses(),
            vec![OrderStatus::Pending, OrderStatus::Cancelled]
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(" DELIVERED ".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&OrderStatus::New).unwrap();
        assert_eq!(json, "\"NEW\"");
        let status: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }
}
