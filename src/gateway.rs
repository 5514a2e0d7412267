use crate::consts::MAX_LOGGED_RESPONSE_CHARS;
use crate::error::{AppError, ExternalCallError};
use crate::signature::verify_signature;
use crate::types::{AppState, WebhookOutcome};
use crate::vogent_types::{ForwardedPayload, VogentEvent, WebhookEnvelope};

use secrecy::ExposeSecret;
use tracing::{debug, error, info};

/// Verify, classify and, for extraction results, forward one Vogent webhook delivery.
///
/// Only signature failures and unparseable bodies are returned as errors. A failed forward is
/// reported through [`WebhookOutcome::ForwardFailed`] so the caller still acknowledges Vogent.
pub async fn handle_webhook(
    app_state: &AppState,
    raw_body: &[u8],
    signature: Option<&str>,
) -> Result<WebhookOutcome, AppError> {
    let Some(signature) = signature else {
        debug!("webhook delivery missing signature header");
        return Err(AppError::SignatureRejected);
    };
    let secret = app_state.config.vogent_webhook_secret.expose_secret();
    if let Err(e) = verify_signature(raw_body, signature, secret) {
        debug!("invalid webhook signature");
        return Err(e);
    }
    debug!("webhook signature verified");

    let envelope: WebhookEnvelope = serde_json::from_slice(raw_body).map_err(|e| {
        debug!(error=%e, "failed to deserialize vogent webhook envelope");
        AppError::InvalidBody(e.to_string())
    })?;
    info!(event=%envelope.event, "vogent webhook received");

    let event = envelope.into_event().map_err(|e| {
        debug!(error=%e, "failed to deserialize extractor payload");
        AppError::InvalidBody(e.to_string())
    })?;

    match event {
        VogentEvent::Ignored { event, dial_id } => {
            info!(event=%event, dial_id=?dial_id, "event logged only, not forwarded");
            Ok(WebhookOutcome::Ignored { event })
        }
        VogentEvent::Extractor { payload, metadata } => {
            let dial_id = payload.dial_id.clone();
            info!(
                dial_id=?dial_id,
                lead_id=?metadata.lead_id,
                batch_id=?metadata.batch_id,
                "received ai extraction"
            );
            let forwarded = ForwardedPayload::new(payload, metadata);
            match forward_to_workflow(app_state, &forwarded).await {
                Ok(()) => Ok(WebhookOutcome::Forwarded { dial_id }),
                Err(e) => {
                    // Vogent still gets a 2xx, so this extraction is dropped.
                    error!(
                        error=%e,
                        dial_id=?dial_id,
                        lead_id=?forwarded.lead_id,
                        batch_id=?forwarded.batch_id,
                        "extraction not delivered to workflow; acknowledging vogent anyway"
                    );
                    Ok(WebhookOutcome::ForwardFailed { dial_id })
                }
            }
        }
    }
}

/// POST one extraction result to the n8n workflow.
pub async fn forward_to_workflow(
    app_state: &AppState,
    payload: &ForwardedPayload,
) -> Result<(), AppError> {
    let url = &app_state.config.n8n_webhook_url;
    debug!(url=%url, payload=?payload, "sending to workflow webhook");

    let resp = app_state
        .http_client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| AppError::DownstreamForward(e.into()))?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(AppError::DownstreamForward(ExternalCallError::Status {
            status: status.as_u16(),
            body,
        }));
    }
    info!(status=%status, response=%truncate(&body, MAX_LOGGED_RESPONSE_CHARS), "workflow accepted extraction");
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [truncated]", &s[..idx]),
        None => s.to_string(),
    }
}
