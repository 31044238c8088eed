use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::order::{
    CallerIdentity, OrderStatusCommandHandler, UpdateOrderStatus, UpdateStatusError,
};
use crate::models::UpdateRequest;
use crate::store::DocumentStore;

pub struct ApiState {
    pub commands: OrderStatusCommandHandler,
    pub store: Arc<dyn DocumentStore>,
    pub identity_header: String,
}

impl ApiState {
    /// Uid injected by the auth layer in front of this service, if any.
    fn caller(&self, req: &HttpRequest) -> Option<CallerIdentity> {
        req.headers()
            .get(self.identity_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(CallerIdentity::new)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/updateOrderStatus", web::post().to(update_order_status))
        .route("/orderStatusRequests", web::post().to(create_status_request));
}

// ============================================================================
// Callable wire format
// ============================================================================

#[derive(Deserialize)]
struct CallableRequest<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Serialize)]
struct CallableResult<T> {
    result: T,
}

#[derive(Serialize)]
struct CallableError<'a> {
    status: &'a str,
    message: String,
}

impl ResponseError for UpdateStatusError {
    fn status_code(&self) -> StatusCode {
        match self {
            UpdateStatusError::Unauthenticated => StatusCode::UNAUTHORIZED,
            UpdateStatusError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            UpdateStatusError::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateStatusError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            UpdateStatusError::FailedPrecondition(_) => StatusCode::BAD_REQUEST,
            UpdateStatusError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": CallableError { status: self.code(), message: self.to_string() }
        }))
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn update_order_status(
    state: web::Data<ApiState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, UpdateStatusError> {
    let caller = state.caller(&req);

    // An undecodable body is treated as an empty payload so the identity
    // check still runs first.
    let command = serde_json::from_slice::<CallableRequest<UpdateOrderStatus>>(&body)
        .ok()
        .and_then(|request| request.data)
        .unwrap_or_default();

    let ack = state.commands.handle(caller.as_ref(), command).await?;
    Ok(HttpResponse::Ok().json(CallableResult { result: ack }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewStatusRequest {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    merchant_id: Option<String>,
    #[serde(default)]
    new_status: Option<String>,
}

#[derive(Serialize)]
struct CreatedResponse {
    id: String,
}

async fn create_status_request(
    state: web::Data<ApiState>,
    body: web::Json<NewStatusRequest>,
) -> Result<HttpResponse, UpdateStatusError> {
    let body = body.into_inner();
    let request = UpdateRequest {
        order_id: body.order_id,
        merchant_id: body.merchant_id,
        new_status: body.new_status,
        ..Default::default()
    };

    let id = state.store.create_request(request).await?;
    tracing::debug!(request_id = %id, "Accepted queued status request");

    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::metrics::Metrics;
    use crate::models::Order;
    use crate::store::MemoryStore;
    use actix_web::{test, App};

    async fn state() -> (web::Data<ApiState>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.create_order("O1", Order::new("M1", OrderStatus::Pending)).await.unwrap();
        let state = ApiState {
            commands: OrderStatusCommandHandler::new(store.clone(), Arc::new(Metrics::new().unwrap())),
            store: store.clone(),
            identity_header: "x-verified-uid".to_string(),
        };
        (web::Data::new(state), store)
    }

    #[actix_web::test]
    async fn test_callable_success() {
        let (state, store) = state().await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/updateOrderStatus")
            .insert_header(("x-verified-uid", "M1"))
            .set_json(serde_json::json!({ "data": { "orderId": "O1", "newStatus": "preparing" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["result"]["success"], true);
        assert_eq!(body["result"]["message"], "Order status updated to preparing");
        assert_eq!(store.get_order("O1").await.unwrap().unwrap().status, "preparing");
    }

    #[actix_web::test]
    async fn test_callable_without_identity() {
        let (state, _) = state().await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/updateOrderStatus")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], "UNAUTHENTICATED");
    }

    #[actix_web::test]
    async fn test_callable_error_tags() {
        let (state, _) = state().await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let cases = [
            ("M1", serde_json::json!({ "data": {} }), StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            ("M1", serde_json::json!({ "data": { "orderId": "O9", "newStatus": "ready" } }), StatusCode::NOT_FOUND, "NOT_FOUND"),
            ("M2", serde_json::json!({ "data": { "orderId": "O1", "newStatus": "preparing" } }), StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            ("M1", serde_json::json!({ "data": { "orderId": "O1", "newStatus": "completed" } }), StatusCode::BAD_REQUEST, "FAILED_PRECONDITION"),
        ];

        for (uid, payload, status, tag) in cases {
            let req = test::TestRequest::post()
                .uri("/updateOrderStatus")
                .insert_header(("x-verified-uid", uid))
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["error"]["status"], tag);
        }
    }

    #[actix_web::test]
    async fn test_create_status_request() {
        let (state, store) = state().await;
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/orderStatusRequests")
            .set_json(serde_json::json!({ "orderId": "O1", "merchantId": "M1", "newStatus": "preparing" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let id = body["id"].as_str().unwrap();
        let request = store.get_request(id).await.unwrap().unwrap();
        assert_eq!(request.order_id.as_deref(), Some("O1"));
        assert!(!request.processed);
    }
}
