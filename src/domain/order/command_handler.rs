use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{Metrics, CALLABLE};
use crate::models::{non_empty, StatusChange};
use crate::store::{DocumentStore, OrderWrite};

use super::commands::{CallerIdentity, UpdateAck, UpdateOrderStatus};
use super::errors::UpdateStatusError;
use super::value_objects::checked_transition;

// ============================================================================
// Order Status Command Handler - `updateOrderStatus` callable
// ============================================================================
//
// Orchestrates: Caller → Ownership → Transition Table → Conditional Write
//
// Every check short-circuits with its own tagged failure.
//
// ============================================================================

pub struct OrderStatusCommandHandler {
    store: Arc<dyn DocumentStore>,
    metrics: Arc<Metrics>,
}

impl OrderStatusCommandHandler {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Handle a status change on behalf of `caller`.
    pub async fn handle(
        &self,
        caller: Option<&CallerIdentity>,
        command: UpdateOrderStatus,
    ) -> Result<UpdateAck, UpdateStatusError> {
        let started = Instant::now();
        let result = self.apply(caller, &command).await;
        let elapsed = started.elapsed().as_secs_f64();

        let order_id = command.order_id.as_deref().unwrap_or_default();
        let new_status = command.new_status.as_deref().unwrap_or_default();
        let merchant_id = caller.map(CallerIdentity::uid).unwrap_or_default();

        match &result {
            Ok(_) => {
                tracing::info!(
                    order_id = %order_id,
                    merchant_id = %merchant_id,
                    new_status = %new_status,
                    "Successfully updated order {} status to {}",
                    order_id,
                    new_status
                );
                self.metrics.record_outcome(CALLABLE, true, elapsed);
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    merchant_id = %merchant_id,
                    new_status = %new_status,
                    code = e.code(),
                    error = %e,
                    "Error updating order {} status",
                    order_id
                );
                self.metrics.record_outcome(CALLABLE, false, elapsed);
                self.metrics.record_failure_reason(CALLABLE, e.reason());
            }
        }

        result
    }

    async fn apply(
        &self,
        caller: Option<&CallerIdentity>,
        command: &UpdateOrderStatus,
    ) -> Result<UpdateAck, UpdateStatusError> {
        let caller = caller.ok_or(UpdateStatusError::Unauthenticated)?;

        let (Some(order_id), Some(new_status)) =
            (non_empty(&command.order_id), non_empty(&command.new_status))
        else {
            return Err(UpdateStatusError::InvalidArgument(
                "The function must be called with orderId and newStatus arguments.".to_string(),
            ));
        };

        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| UpdateStatusError::NotFound(format!("Order {} does not exist", order_id)))?;

        if order.merchant_id != caller.uid() {
            return Err(UpdateStatusError::PermissionDenied(
                "You are not authorized to update this order".to_string(),
            ));
        }

        let target = checked_transition(&order.status, new_status).ok_or_else(|| {
            UpdateStatusError::FailedPrecondition(format!(
                "Invalid status transition from {} to {}",
                order.status, new_status
            ))
        })?;

        let change = StatusChange {
            expected_status: order.status,
            new_status: target,
        };

        match self.store.apply_status_change(order_id, &change).await? {
            OrderWrite::Applied => Ok(UpdateAck {
                success: true,
                message: format!("Order status updated to {}", target),
            }),
            OrderWrite::StatusMismatch { actual } => Err(UpdateStatusError::FailedPrecondition(format!(
                "Order {} status changed concurrently from {} to {}",
                order_id, change.expected_status, actual
            ))),
            OrderWrite::Missing => Err(UpdateStatusError::NotFound(format!(
                "Order {} does not exist",
                order_id
            ))),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
