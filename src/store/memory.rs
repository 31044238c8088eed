use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{
    DocumentStore, OrderWrite, RequestCommit, RequestCreated, StoreError, ORDERS,
    ORDER_STATUS_REQUESTS,
};
use crate::models::{Order, RequestOutcome, StatusChange, UpdateRequest};

const FEED_CAPACITY: usize = 1024;

// ============================================================================
// In-Memory Document Store
// ============================================================================
//
// Both collections live behind one lock so a queued commit can touch the
// order and its request atomically. Timestamps are taken inside the write
// lock and play the role of server time.
//
// ============================================================================

#[derive(Default)]
struct Collections {
    orders: HashMap<String, Order>,
    requests: HashMap<String, UpdateRequest>,
}

pub struct MemoryStore {
    collections: RwLock<Collections>,
    created: broadcast::Sender<RequestCreated>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (created, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            collections: RwLock::new(Collections::default()),
            created,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_change(order: &mut Order, change: &StatusChange, now: DateTime<Utc>) {
    order.status = change.new_status.to_string();
    order.updated_at = Some(now);
    if change.stamps_completion() {
        order.completed_at = Some(now);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.orders.get(order_id).cloned())
    }

    async fn create_order(&self, order_id: &str, order: Order) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if collections.orders.contains_key(order_id) {
            return Err(StoreError::AlreadyExists {
                collection: ORDERS,
                id: order_id.to_string(),
            });
        }
        collections.orders.insert(order_id.to_string(), order);
        Ok(())
    }

    async fn apply_status_change(
        &self,
        order_id: &str,
        change: &StatusChange,
    ) -> Result<OrderWrite, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(order) = collections.orders.get_mut(order_id) else {
            return Ok(OrderWrite::Missing);
        };

        if order.status != change.expected_status {
            return Ok(OrderWrite::StatusMismatch { actual: order.status.clone() });
        }

        apply_change(order, change, Utc::now());
        Ok(OrderWrite::Applied)
    }

    async fn create_request(&self, request: UpdateRequest) -> Result<String, StoreError> {
        let request_id = Uuid::new_v4().to_string();
        {
            let mut collections = self.collections.write().await;
            collections.requests.insert(request_id.clone(), request);
        }

        // No subscribers yet is not an error; the record stays unprocessed.
        let receivers = self
            .created
            .send(RequestCreated { request_id: request_id.clone() })
            .unwrap_or(0);

        tracing::debug!(
            collection = ORDER_STATUS_REQUESTS,
            request_id = %request_id,
            receivers,
            "Request document created"
        );

        Ok(request_id)
    }

    async fn get_request(&self, request_id: &str) -> Result<Option<UpdateRequest>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.requests.get(request_id).cloned())
    }

    async fn commit_request(
        &self,
        request_id: &str,
        order_change: Option<(&str, &StatusChange)>,
        outcome: &RequestOutcome,
    ) -> Result<RequestCommit, StoreError> {
        let mut guard = self.collections.write().await;
        let collections = &mut *guard;

        let Some(request) = collections.requests.get_mut(request_id) else {
            return Ok(RequestCommit::Missing);
        };
        if let Some(recorded) = request.recorded_outcome() {
            return Ok(RequestCommit::AlreadyProcessed(recorded));
        }

        let now = Utc::now();

        if let Some((order_id, change)) = order_change {
            let Some(order) = collections.orders.get_mut(order_id) else {
                return Ok(RequestCommit::Missing);
            };
            if order.status != change.expected_status {
                return Ok(RequestCommit::OrderChanged { actual: order.status.clone() });
            }
            apply_change(order, change, now);
        }

        request.processed = true;
        request.processed_at = Some(now);
        request.success = Some(outcome.success);
        request.error = outcome.error.clone();

        Ok(RequestCommit::Committed)
    }

    fn subscribe_requests(&self) -> broadcast::Receiver<RequestCreated> {
        self.created.subscribe()
    }

    fn request_subscribers(&self) -> usize {
        self.created.receiver_count()
    }
}
