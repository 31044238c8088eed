use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

use super::{DocumentStore, MemoryStore, OrderWrite, RequestCommit, RequestCreated, StoreError};
use crate::domain::order::OrderStatus;
use crate::models::{Order, RequestOutcome, StatusChange, UpdateRequest};

// ============================================================================
// Fault-injecting store for handler tests
// ============================================================================
//
// Wraps `MemoryStore` and fails or races individual calls on demand. Every
// switch except `fail_commits` fires once and then resets.
//
// ============================================================================

#[derive(Default)]
pub(crate) struct FaultyStore {
    pub inner: MemoryStore,
    fail_get_request: AtomicBool,
    fail_order_commit: AtomicBool,
    fail_commits: AtomicBool,
    interloper: Mutex<Option<OrderStatus>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_get_request(&self) {
        self.fail_get_request.store(true, Ordering::SeqCst);
    }

    /// Fails the next commit that carries an order change.
    pub fn fail_next_order_commit(&self) {
        self.fail_order_commit.store(true, Ordering::SeqCst);
    }

    pub fn fail_all_commits(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    /// Moves the order to `status` right before the next conditional write.
    pub fn race_next_write(&self, status: OrderStatus) {
        *self.interloper.lock().unwrap() = Some(status);
    }

    async fn run_interloper(&self, order_id: &str, change: &StatusChange) {
        let racer = self.interloper.lock().unwrap().take();
        if let Some(status) = racer {
            let sneak = StatusChange {
                expected_status: change.expected_status.clone(),
                new_status: status,
            };
            self.inner.apply_status_change(order_id, &sneak).await.unwrap();
        }
    }
}

fn backend(message: &str) -> StoreError {
    StoreError::Backend(message.to_string())
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(order_id).await
    }

    async fn create_order(&self, order_id: &str, order: Order) -> Result<(), StoreError> {
        self.inner.create_order(order_id, order).await
    }

    async fn apply_status_change(
        &self,
        order_id: &str,
        change: &StatusChange,
    ) -> Result<OrderWrite, StoreError> {
        self.run_interloper(order_id, change).await;
        self.inner.apply_status_change(order_id, change).await
    }

    async fn create_request(&self, request: UpdateRequest) -> Result<String, StoreError> {
        self.inner.create_request(request).await
    }

    async fn get_request(&self, request_id: &str) -> Result<Option<UpdateRequest>, StoreError> {
        if self.fail_get_request.swap(false, Ordering::SeqCst) {
            return Err(backend("transient read"));
        }
        self.inner.get_request(request_id).await
    }

    async fn commit_request(
        &self,
        request_id: &str,
        order_change: Option<(&str, &StatusChange)>,
        outcome: &RequestOutcome,
    ) -> Result<RequestCommit, StoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(backend("write unavailable"));
        }
        if let Some((order_id, change)) = order_change {
            if self.fail_order_commit.swap(false, Ordering::SeqCst) {
                return Err(backend("commit aborted"));
            }
            self.run_interloper(order_id, change).await;
        }
        self.inner.commit_request(request_id, order_change, outcome).await
    }

    fn subscribe_requests(&self) -> broadcast::Receiver<RequestCreated> {
        self.inner.subscribe_requests()
    }

    fn request_subscribers(&self) -> usize {
        self.inner.request_subscribers()
    }
}
