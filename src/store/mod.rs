// ============================================================================
// Document Store - backing store collaborator
// ============================================================================
//
// The handlers only ever talk to the store through `DocumentStore`.
// Implementations must provide:
// 1. Atomic single-document read-modify-write for order status changes
// 2. Server-assigned timestamps (`updatedAt`, `completedAt`, `processedAt`)
// 3. A creation feed for `orderStatusRequests`, delivered at least once
//
// ============================================================================

mod memory;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::{Order, RequestOutcome, StatusChange, UpdateRequest};

pub use memory::MemoryStore;

pub const ORDERS: &str = "orders";
pub const ORDER_STATUS_REQUESTS: &str = "orderStatusRequests";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} already exists")]
    AlreadyExists { collection: &'static str, id: String },

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result of a conditional order status write.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderWrite {
    Applied,
    /// The order no longer holds the expected status; nothing was written.
    StatusMismatch { actual: String },
    Missing,
}

/// Result of committing a queued request's outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestCommit {
    Committed,
    /// Another delivery already recorded an outcome; nothing was written.
    AlreadyProcessed(RequestOutcome),
    /// The target order moved away from the expected status; nothing was written.
    OrderChanged { actual: String },
    /// The request or the target order vanished; nothing was written.
    Missing,
}

/// Emitted once per `orderStatusRequests` creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCreated {
    pub request_id: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Creates an order. Existing orders are never overwritten, which keeps
    /// `merchantId` immutable.
    async fn create_order(&self, order_id: &str, order: Order) -> Result<(), StoreError>;

    /// Sets `status` and `updatedAt` (plus `completedAt` when completing)
    /// if the order still holds `change.expected_status`.
    async fn apply_status_change(
        &self,
        order_id: &str,
        change: &StatusChange,
    ) -> Result<OrderWrite, StoreError>;

    /// Stores a new request, returns its generated id and fires the creation feed.
    async fn create_request(&self, request: UpdateRequest) -> Result<String, StoreError>;

    async fn get_request(&self, request_id: &str) -> Result<Option<UpdateRequest>, StoreError>;

    /// Marks the request processed with `outcome`, together with the order
    /// change when one is given, in a single atomic write. Applies only while
    /// the request is still unprocessed.
    async fn commit_request(
        &self,
        request_id: &str,
        order_change: Option<(&str, &StatusChange)>,
        outcome: &RequestOutcome,
    ) -> Result<RequestCommit, StoreError>;

    fn subscribe_requests(&self) -> broadcast::Receiver<RequestCreated>;

    /// Live subscribers on the creation feed. Zero means nothing is
    /// processing queued requests.
    fn request_subscribers(&self) -> usize;
}
