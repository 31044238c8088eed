use crate::store::StoreError;

// ============================================================================
// Status Update Errors - tagged failures surfaced to callable clients
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateStatusError {
    #[error("You must be logged in to update an order status.")]
    Unauthenticated,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    Internal(String),
}

impl UpdateStatusError {
    /// Wire tag clients branch on.
    pub fn code(&self) -> &'static str {
        match self {
            UpdateStatusError::Unauthenticated => "UNAUTHENTICATED",
            UpdateStatusError::InvalidArgument(_) => "INVALID_ARGUMENT",
            UpdateStatusError::NotFound(_) => "NOT_FOUND",
            UpdateStatusError::PermissionDenied(_) => "PERMISSION_DENIED",
            UpdateStatusError::FailedPrecondition(_) => "FAILED_PRECONDITION",
            UpdateStatusError::Internal(_) => "INTERNAL",
        }
    }

    /// Low-cardinality label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            UpdateStatusError::Unauthenticated => "unauthenticated",
            UpdateStatusError::InvalidArgument(_) => "invalid_argument",
            UpdateStatusError::NotFound(_) => "not_found",
            UpdateStatusError::PermissionDenied(_) => "permission_denied",
            UpdateStatusError::FailedPrecondition(_) => "failed_precondition",
            UpdateStatusError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for UpdateStatusError {
    fn from(err: StoreError) -> Self {
        UpdateStatusError::Internal(err.to_string())
    }
}

/// Rejections recorded onto a queued request. These never leave the trigger
/// as errors; their display text becomes the request's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestRejection {
    #[error("Missing required fields in request data")]
    MissingFields,

    #[error("Order {0} does not exist")]
    OrderNotFound(String),

    #[error("Merchant is not authorized to update this order")]
    NotAuthorized,

    #[error("Invalid status transition from {current} to {requested}")]
    InvalidTransition { current: String, requested: String },

    #[error("Order {order_id} status changed concurrently from {expected}")]
    ConcurrentChange { order_id: String, expected: String },

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl RequestRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            RequestRejection::MissingFields => "missing_fields",
            RequestRejection::OrderNotFound(_) => "not_found",
            RequestRejection::NotAuthorized => "not_authorized",
            RequestRejection::InvalidTransition { .. } => "invalid_transition",
            RequestRejection::ConcurrentChange { .. } => "concurrent_change",
            RequestRejection::Store(_) => "internal",
        }
    }
}
