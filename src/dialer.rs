use crate::consts::DIAL_TIMEOUT_MINUTES;
use crate::error::{AppError, ExternalCallError};
use crate::phone::{normalize, NormalizedPhoneNumber};
use crate::types::{AppState, CallRequest, OutboundCallResult};
use crate::vogent_types::{CallMetadata, CreateDialRequest, CreateDialResponse};

use secrecy::ExposeSecret;
use tracing::{debug, info};

/// Validate the request, then ask Vogent to place exactly one outbound call.
pub async fn initiate_call(
    app_state: &AppState,
    request: CallRequest,
) -> Result<OutboundCallResult, AppError> {
    let raw_phone = request
        .phone_number
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or(AppError::MissingField("phoneNumber"))?;
    let phone_number = normalize(raw_phone)?;
    let metadata = request.metadata();

    info!(
        to=%phone_number,
        lead_id=?metadata.lead_id,
        batch_id=?metadata.batch_id,
        "initiating outbound call"
    );

    let dial = create_vogent_call(app_state, &phone_number, &metadata).await?;
    info!(call_id=%dial.id, to=%phone_number, "vogent accepted call");

    Ok(OutboundCallResult {
        success: true,
        call_id: dial.id,
    })
}

async fn create_vogent_call(
    app_state: &AppState,
    phone_number: &NormalizedPhoneNumber,
    metadata: &CallMetadata,
) -> Result<CreateDialResponse, AppError> {
    let config = &app_state.config;
    let url = format!("{}/api/dials", config.vogent_api_base_url);
    let metadata = (!metadata.is_empty()).then_some(metadata);
    let payload = CreateDialRequest {
        call_agent_id: &config.vogent_agent_id,
        ai_voice_id: &config.vogent_voice_id,
        to_number: phone_number,
        from_number_id: &config.vogent_phone_number_id,
        browser_call: false,
        timeout_minutes: DIAL_TIMEOUT_MINUTES,
        call_agent_input: metadata,
        metadata,
    };

    let resp = app_state
        .http_client
        .post(url)
        .bearer_auth(config.vogent_api_key.expose_secret())
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            debug!(error=%e, "failed to send dial request to vogent");
            AppError::UpstreamCall(e.into())
        })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        debug!(status=%status, body=%body, "vogent rejected dial request");
        return Err(AppError::UpstreamCall(ExternalCallError::Status {
            status: status.as_u16(),
            body,
        }));
    }

    resp.json::<CreateDialResponse>().await.map_err(|e| {
        debug!(error=%e, "failed to deserialize vogent dial response");
        AppError::UpstreamCall(ExternalCallError::MalformedResponse(e.to_string()))
    })
}
