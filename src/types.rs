use crate::config::Config;
use crate::consts::{CONNECT_TIMEOUT_SECS, HTTP_TIMEOUT_SECS};
use crate::vogent_types::CallMetadata;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub struct AppState {
    pub config: Config,
    /// Shared by outbound dials and workflow forwards; every request is bounded by its timeout.
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        Self::with_timeout(config, Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    /// Like [`AppState::new`] with a different bound on each outbound request.
    pub fn with_timeout(config: Config, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Body of `POST /outgoing-call`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl CallRequest {
    pub fn metadata(&self) -> CallMetadata {
        CallMetadata {
            lead_id: self.lead_id.clone().map(Value::String),
            batch_id: self.batch_id.clone().map(Value::String),
            resume_url: self.resume_url.clone().map(Value::String),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallResult {
    pub success: bool,
    pub call_id: String,
}

/// How a verified webhook delivery was settled.
#[derive(Debug)]
pub enum WebhookOutcome {
    Forwarded { dial_id: Option<String> },
    Ignored { event: String },
    /// The event matched but the workflow could not be reached; Vogent is still acknowledged.
    ForwardFailed { dial_id: Option<String> },
}

impl WebhookOutcome {
    pub fn forwarded(&self) -> bool {
        matches!(self, Self::Forwarded { .. })
    }
}

#[derive(Serialize, Debug)]
pub struct WebhookAck {
    pub success: bool,
    pub forwarded: bool,
}
