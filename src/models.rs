use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::domain::order::OrderStatus;

// ============================================================================
// Stored Documents
// ============================================================================
//
// Shapes of the two collections this service touches:
// - orders/{orderId}
// - orderStatusRequests/{requestId}
//
// Field names follow the camelCase convention of the document store.
//
// ============================================================================

/// `orders/{orderId}`
///
/// `status` is kept as the raw stored string: orders are created by an
/// external flow and may carry values this service does not recognise.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub status: String,
    pub merchant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(merchant_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            status: status.to_string(),
            merchant_id: merchant_id.into(),
            updated_at: None,
            completed_at: None,
        }
    }
}

/// `orderStatusRequests/{requestId}`
///
/// The three input fields are optional so a malformed record can still be
/// loaded and have its rejection written back onto it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub merchant_id: Option<String>,
    #[serde(default)]
    pub new_status: Option<String>,

    #[serde(default)]
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateRequest {
    pub fn new(
        order_id: impl Into<String>,
        merchant_id: impl Into<String>,
        new_status: impl Into<String>,
    ) -> Self {
        Self {
            order_id: Some(order_id.into()),
            merchant_id: Some(merchant_id.into()),
            new_status: Some(new_status.into()),
            ..Default::default()
        }
    }

    /// The outcome already written back, if this request was processed.
    pub fn recorded_outcome(&self) -> Option<RequestOutcome> {
        if !self.processed {
            return None;
        }
        Some(RequestOutcome {
            success: self.success.unwrap_or(false),
            error: self.error.clone(),
        })
    }
}

/// A status move validated against the transition table.
///
/// `expected_status` is the status the order held when it was validated; the
/// store applies the change only if the order still holds it.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusChange {
    pub expected_status: String,
    pub new_status: OrderStatus,
}

impl StatusChange {
    pub fn stamps_completion(&self) -> bool {
        self.new_status == OrderStatus::Completed
    }
}

/// Outcome written back onto a queued request and returned to the trigger.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RequestOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestOutcome {
    pub fn success() -> Self {
        Self { success: true, error: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()) }
    }
}

/// Treats absent and empty strings alike.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_document_shape() {
        let order = Order::new("M1", OrderStatus::Pending);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "pending", "merchantId": "M1" }));
    }

    #[test]
    fn test_request_without_processed_flag_is_fresh() {
        let request: UpdateRequest = serde_json::from_value(serde_json::json!({
            "orderId": "O1",
            "merchantId": "M1",
            "newStatus": "ready"
        }))
        .unwrap();

        assert!(!request.processed);
        assert_eq!(request.recorded_outcome(), None);
        assert_eq!(request.new_status.as_deref(), Some("ready"));
    }

    #[test]
    fn test_recorded_outcome_of_processed_request() {
        let request = UpdateRequest {
            processed: true,
            success: Some(false),
            error: Some("Order O1 does not exist".to_string()),
            ..UpdateRequest::new("O1", "M1", "ready")
        };

        assert_eq!(
            request.recorded_outcome(),
            Some(RequestOutcome::failure("Order O1 does not exist"))
        );
    }

    #[test]
    fn test_outcome_omits_missing_error() {
        let json = serde_json::to_value(RequestOutcome::success()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("O1".to_string())), Some("O1"));
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&None), None);
    }
}
