use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{Metrics, TRIGGER};
use crate::models::{non_empty, RequestOutcome, StatusChange, UpdateRequest};
use crate::store::{DocumentStore, RequestCommit};

use super::errors::RequestRejection;
use super::value_objects::checked_transition;

// ============================================================================
// Queued Request Handler - `orderStatusRequests` creation trigger
// ============================================================================
//
// Privilege boundary: this handler runs with full store access and trusts
// the `merchantId` written into the request record. It performs no caller
// authentication. Whoever can create `orderStatusRequests` documents can act
// as any merchant, so that collection must only be writable by producers that
// stamp their own verified merchant id.
//
// Delivery is at least once. A request is claimed and its order change applied
// in one conditional commit, so redelivery of a processed request is a no-op.
//
// Nothing here is propagated as an error: every outcome, good or bad, is
// written back onto the request and returned. When that write itself fails,
// the returned outcome says so and the request stays unprocessed.
//
// ============================================================================

/// What a single delivery did with the request.
enum Delivery {
    /// This delivery wrote the outcome.
    Recorded(RequestOutcome),
    /// Another delivery got there first; carries its outcome.
    Duplicate(RequestOutcome),
    /// Writing the outcome failed; the request is still unprocessed.
    Unrecorded(RequestOutcome),
}

struct ValidatedRequest<'a> {
    order_id: &'a str,
    change: StatusChange,
}

pub struct QueuedRequestHandler {
    store: Arc<dyn DocumentStore>,
    metrics: Arc<Metrics>,
}

impl QueuedRequestHandler {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn handle(&self, request_id: &str) -> RequestOutcome {
        let started = Instant::now();

        let request = match self.store.get_request(request_id).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::warn!(request_id = %request_id, "Request document no longer exists");
                return RequestOutcome::failure(format!("Request {} does not exist", request_id));
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to load request document"
                );
                // Fields are unknown; the outcome is still written against the id.
                let delivery = self
                    .commit_failure(request_id, &UpdateRequest::default(), e.into())
                    .await;
                return self.finish(request_id, delivery, started);
            }
        };

        if let Some(recorded) = request.recorded_outcome() {
            tracing::debug!(
                request_id = %request_id,
                success = recorded.success,
                "Request already processed, skipping redelivery"
            );
            self.metrics.record_skipped();
            return recorded;
        }

        let delivery = match self.validate(&request).await {
            Ok(valid) => self.commit_success(request_id, &request, valid).await,
            Err(rejection) => self.commit_failure(request_id, &request, rejection).await,
        };

        self.finish(request_id, delivery, started)
    }

    fn finish(&self, request_id: &str, delivery: Delivery, started: Instant) -> RequestOutcome {
        match delivery {
            Delivery::Recorded(outcome) => {
                self.metrics
                    .record_outcome(TRIGGER, outcome.success, started.elapsed().as_secs_f64());
                outcome
            }
            Delivery::Duplicate(recorded) => {
                tracing::debug!(
                    request_id = %request_id,
                    "Request processed by a concurrent delivery"
                );
                self.metrics.record_skipped();
                recorded
            }
            Delivery::Unrecorded(outcome) => outcome,
        }
    }

    async fn validate<'a>(
        &self,
        request: &'a UpdateRequest,
    ) -> Result<ValidatedRequest<'a>, RequestRejection> {
        let (Some(order_id), Some(merchant_id), Some(new_status)) = (
            non_empty(&request.order_id),
            non_empty(&request.merchant_id),
            non_empty(&request.new_status),
        ) else {
            return Err(RequestRejection::MissingFields);
        };

        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| RequestRejection::OrderNotFound(order_id.to_string()))?;

        if order.merchant_id != merchant_id {
            return Err(RequestRejection::NotAuthorized);
        }

        let Some(target) = checked_transition(&order.status, new_status) else {
            return Err(RequestRejection::InvalidTransition {
                current: order.status,
                requested: new_status.to_string(),
            });
        };

        Ok(ValidatedRequest {
            order_id,
            change: StatusChange {
                expected_status: order.status,
                new_status: target,
            },
        })
    }

    async fn commit_success(
        &self,
        request_id: &str,
        request: &UpdateRequest,
        valid: ValidatedRequest<'_>,
    ) -> Delivery {
        let commit = self
            .store
            .commit_request(
                request_id,
                Some((valid.order_id, &valid.change)),
                &RequestOutcome::success(),
            )
            .await;

        match commit {
            Ok(RequestCommit::Committed) => {
                tracing::info!(
                    request_id = %request_id,
                    order_id = %valid.order_id,
                    merchant_id = %request.merchant_id.as_deref().unwrap_or_default(),
                    new_status = %valid.change.new_status,
                    "Successfully updated order {} status to {}",
                    valid.order_id,
                    valid.change.new_status
                );
                Delivery::Recorded(RequestOutcome::success())
            }
            Ok(RequestCommit::AlreadyProcessed(recorded)) => Delivery::Duplicate(recorded),
            Ok(RequestCommit::OrderChanged { .. }) => {
                let rejection = RequestRejection::ConcurrentChange {
                    order_id: valid.order_id.to_string(),
                    expected: valid.change.expected_status.clone(),
                };
                self.commit_failure(request_id, request, rejection).await
            }
            Ok(RequestCommit::Missing) => {
                let rejection = RequestRejection::OrderNotFound(valid.order_id.to_string());
                self.commit_failure(request_id, request, rejection).await
            }
            Err(e) => self.commit_failure(request_id, request, e.into()).await,
        }
    }

    async fn commit_failure(
        &self,
        request_id: &str,
        request: &UpdateRequest,
        rejection: RequestRejection,
    ) -> Delivery {
        let outcome = RequestOutcome::failure(rejection.to_string());

        let write_error = match self.store.commit_request(request_id, None, &outcome).await {
            Ok(RequestCommit::AlreadyProcessed(recorded)) => return Delivery::Duplicate(recorded),
            Ok(_) => None,
            Err(e) => Some(e),
        };

        tracing::error!(
            request_id = %request_id,
            order_id = %request.order_id.as_deref().unwrap_or_default(),
            merchant_id = %request.merchant_id.as_deref().unwrap_or_default(),
            new_status = %request.new_status.as_deref().unwrap_or_default(),
            error = %rejection,
            "Error updating order {} status",
            request.order_id.as_deref().unwrap_or_default()
        );
        self.metrics.record_failure_reason(TRIGGER, rejection.reason());

        match write_error {
            None => Delivery::Recorded(outcome),
            Some(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to record request outcome"
                );
                self.metrics.record_failure_reason(TRIGGER, "outcome_not_recorded");
                Delivery::Unrecorded(RequestOutcome::failure(format!(
                    "{}; failed to record outcome: {}",
                    rejection, e
                )))
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
