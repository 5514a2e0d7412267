use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Why a request to the voice provider or the workflow endpoint did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ExternalCallError {
    #[error("timed out")]
    Timeout,
    #[error("returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ExternalCallError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid phone number format: {0:?}")]
    InvalidPhoneNumber(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Invalid webhook signature")]
    SignatureRejected,
    #[error("Voice provider call failed: {0}")]
    UpstreamCall(ExternalCallError),
    #[error("Workflow forward failed: {0}")]
    DownstreamForward(ExternalCallError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPhoneNumber(_) | Self::MissingField(_) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::SignatureRejected => StatusCode::UNAUTHORIZED,
            Self::UpstreamCall(ExternalCallError::Timeout)
            | Self::DownstreamForward(ExternalCallError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamCall(_) | Self::DownstreamForward(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error=%self, status=%status, "request failed on external dependency");
        } else {
            warn!(error=%self, status=%status, "request rejected");
        }
        // external failure details stay in the logs
        let message = match &self {
            Self::UpstreamCall(_) => "Failed to create call with voice provider".to_string(),
            Self::DownstreamForward(_) => "Failed to forward event to workflow".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(
            AppError::MissingField("phoneNumber").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidPhoneNumber("abc".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn dependency_errors_map_to_gateway_statuses() {
        let timeout = AppError::UpstreamCall(ExternalCallError::Timeout);
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        let rejected = AppError::UpstreamCall(ExternalCallError::Status {
            status: 422,
            body: "bad agent".into(),
        });
        assert_eq!(rejected.status_code(), StatusCode::BAD_GATEWAY);
        assert!(rejected.to_string().contains("422"));
    }

    #[test]
    fn signature_rejection_is_unauthorized() {
        assert_eq!(
            AppError::SignatureRejected.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
