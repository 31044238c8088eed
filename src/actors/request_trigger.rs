use actix::prelude::*;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::order::QueuedRequestHandler;
use crate::models::RequestOutcome;
use crate::store::{DocumentStore, ORDER_STATUS_REQUESTS};

// ============================================================================
// Request Trigger Actor - fires the queued handler on request creation
// ============================================================================
//
// Listens to the store's creation feed for `orderStatusRequests` and hands
// every created request id to `QueuedRequestHandler`. The handler never
// fails, so the actor has no retry or dead-letter path; outcomes live on the
// request documents.
//
// ============================================================================

#[derive(Message, Debug, Clone)]
#[rtype(result = "RequestOutcome")]
pub struct ProcessRequest {
    pub request_id: String,
}

pub struct RequestTriggerActor {
    store: Arc<dyn DocumentStore>,
    handler: Arc<QueuedRequestHandler>,
}

impl RequestTriggerActor {
    pub fn new(store: Arc<dyn DocumentStore>, handler: QueuedRequestHandler) -> Self {
        Self {
            store,
            handler: Arc::new(handler),
        }
    }
}

impl Actor for RequestTriggerActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(collection = ORDER_STATUS_REQUESTS, "RequestTriggerActor started");

        let mut feed = self.store.subscribe_requests();
        let addr = ctx.address();

        actix::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(created) => {
                        if !addr.connected() {
                            break;
                        }
                        addr.do_send(ProcessRequest { request_id: created.request_id });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Skipped requests stay unprocessed in the store.
                        tracing::warn!(skipped, "Request feed lagged, creation events dropped");
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("Request feed closed");
                        break;
                    }
                }
            }
        });
    }
}

impl Handler<ProcessRequest> for RequestTriggerActor {
    type Result = ResponseFuture<RequestOutcome>;

    fn handle(&mut self, msg: ProcessRequest, _: &mut Self::Context) -> Self::Result {
        let handler = self.handler.clone();

        Box::pin(async move {
            tracing::debug!(request_id = %msg.request_id, "Processing queued status request");
            handler.handle(&msg.request_id).await
        })
    }
}
