use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Successor states reachable in one step.
    ///
    /// This is the only place the order lifecycle is defined; both the
    /// callable and the queued handler go through it.
    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Completed, OrderStatus::Cancelled],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Whether an order holding `current` may move to `target`.
///
/// Statuses are compared as stored strings. Anything outside the known set,
/// on either side, is rejected.
pub fn is_valid_transition(current: &str, target: &str) -> bool {
    checked_transition(current, target).is_some()
}

/// Parsed target status if the move is allowed.
pub fn checked_transition(current: &str, target: &str) -> Option<OrderStatus> {
    let current = current.parse::<OrderStatus>().ok()?;
    let target = target.parse::<OrderStatus>().ok()?;
    current.can_transition_to(target).then_some(target)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edges() -> Vec<(&'static str, &'static str)> {
        vec![
            ("pending", "preparing"),
            ("pending", "cancelled"),
            ("preparing", "ready"),
            ("preparing", "cancelled"),
            ("ready", "completed"),
            ("ready", "cancelled"),
        ]
    }

    #[test]
    fn test_defined_edges_are_accepted() {
        for (from, to) in edges() {
            assert!(is_valid_transition(from, to), "{from} -> {to} should be valid");
        }
    }

    #[test]
    fn test_every_other_pair_is_rejected() {
        let edges = edges();
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = edges.contains(&(from.as_str(), to.as_str()));
                assert_eq!(
                    is_valid_transition(from.as_str(), to.as_str()),
                    expected,
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_self_loops_rejected() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
        assert!(!is_valid_transition("pending", "pending"));
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Completed.allowed_transitions().is_empty());
        assert!(OrderStatus::Cancelled.allowed_transitions().is_empty());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_unknown_statuses_rejected() {
        assert!(!is_valid_transition("shipped", "delivered"));
        assert!(!is_valid_transition("pending", "shipped"));
        assert!(!is_valid_transition("shipped", "cancelled"));
        assert!(!is_valid_transition("", "preparing"));
        assert!(!is_valid_transition("Pending", "preparing"));
    }

    #[test]
    fn test_checked_transition_returns_target() {
        assert_eq!(checked_transition("ready", "completed"), Some(OrderStatus::Completed));
        assert_eq!(checked_transition("completed", "ready"), None);
    }

    #[test]
    fn test_order_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");

        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_display_matches_parse() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!(
            "shipped".parse::<OrderStatus>(),
            Err(UnknownStatus("shipped".to_string()))
        );
    }
}
