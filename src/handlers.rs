use crate::consts::SIGNATURE_HEADER;
use crate::dialer::initiate_call;
use crate::error::AppError;
use crate::gateway::handle_webhook;
use crate::types::{AppState, CallRequest, OutboundCallResult, WebhookAck, WebhookOutcome};

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/outgoing-call", post(outgoing_call))
        .route("/vogent-webhook", post(vogent_webhook))
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Vogent Integration Server is running!" }))
}

pub async fn outgoing_call(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<OutboundCallResult>, AppError> {
    trace!(body=%String::from_utf8_lossy(&body), "outgoing call request body");
    let request: CallRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?;
    let result = initiate_call(&app_state, request).await?;
    Ok(Json(result))
}

pub async fn vogent_webhook(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = handle_webhook(&app_state, &body, signature).await?;
    match &outcome {
        WebhookOutcome::Forwarded { dial_id } => debug!(dial_id=?dial_id, "webhook settled: forwarded"),
        WebhookOutcome::Ignored { event } => debug!(event=%event, "webhook settled: ignored"),
        WebhookOutcome::ForwardFailed { dial_id } => {
            warn!(dial_id=?dial_id, "webhook settled: forward failed, acknowledged")
        }
    }
    Ok(Json(WebhookAck {
        success: true,
        forwarded: outcome.forwarded(),
    }))
}
