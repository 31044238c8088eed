use serde::{Deserialize, Serialize};

// ============================================================================
// Order Status Commands - callable payloads and replies
// ============================================================================

/// Identity verified by the fronting auth layer before the callable runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn uid(&self) -> &str {
        &self.0
    }
}

/// `updateOrderStatus` payload. Fields stay optional so that missing values
/// surface as `INVALID_ARGUMENT` rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub new_status: Option<String>,
}

impl UpdateOrderStatus {
    pub fn new(order_id: impl Into<String>, new_status: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            new_status: Some(new_status.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub success: bool,
    pub message: String,
}
