use crate::consts::EXTRACTOR_EVENT;

use serde_json::{Map, Value};

mod metadata {
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};

    /// Correlation identifiers threaded through Vogent and back. Never interpreted here, so the
    /// values are kept as whatever JSON the provider echoes.
    #[derive(Serialize, Deserialize, Clone, Default, PartialEq, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CallMetadata {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub lead_id: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub batch_id: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub resume_url: Option<Value>,
        /// Keys we don't know about, carried through untouched.
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    impl CallMetadata {
        pub fn is_empty(&self) -> bool {
            self.lead_id.is_none()
                && self.batch_id.is_none()
                && self.resume_url.is_none()
                && self.extra.is_empty()
        }
    }
}
pub use metadata::*;

mod dials {
    use super::CallMetadata;
    use crate::phone::NormalizedPhoneNumber;

    use serde::{Deserialize, Serialize};

    /// Body of `POST /api/dials`.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateDialRequest<'a> {
        pub call_agent_id: &'a str,
        pub ai_voice_id: &'a str,
        pub to_number: &'a NormalizedPhoneNumber,
        pub from_number_id: &'a str,
        pub browser_call: bool,
        pub timeout_minutes: u32,
        /// Visible to the agent prompt during the call.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub call_agent_input: Option<&'a CallMetadata>,
        /// Echoed back by Vogent on every webhook for this dial.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub metadata: Option<&'a CallMetadata>,
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateDialResponse {
        pub id: String,
    }
}
pub use dials::*;

mod webhook {
    use super::CallMetadata;

    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};

    fn empty_object() -> Value {
        Value::Object(Map::new())
    }

    /// Outer shape of every Vogent webhook delivery.
    #[derive(Deserialize, Debug)]
    pub struct WebhookEnvelope {
        #[serde(alias = "type")]
        pub event: String,
        #[serde(alias = "data", default)]
        pub payload: Value,
        /// Kept raw; anything but an object is treated as absent.
        #[serde(default)]
        pub metadata: Value,
    }

    #[derive(Deserialize, Debug)]
    pub struct ExtractorPayload {
        #[serde(default)]
        pub dial_id: Option<String>,
        /// `{}` when the key is missing; an explicit `null` stays `null`.
        #[serde(default = "empty_object")]
        pub ai_result: Value,
        #[serde(default)]
        pub metadata: Value,
    }

    /// Webhook events, split into the one we act on and everything else.
    #[derive(Debug)]
    pub enum VogentEvent {
        Extractor {
            payload: ExtractorPayload,
            metadata: CallMetadata,
        },
        Ignored {
            event: String,
            dial_id: Option<String>,
        },
    }

    /// Body posted to the n8n workflow for an extraction result. The correlation keys are always
    /// present, `null` when Vogent did not echo them.
    #[derive(Serialize, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ForwardedPayload {
        /// The AI extraction result, JSON-encoded as a string.
        pub data: String,
        pub lead_id: Option<Value>,
        pub batch_id: Option<Value>,
        pub resume_url: Option<Value>,
        pub dial_id: Option<String>,
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }
}
pub use webhook::*;

/// Read echoed metadata leniently: non-objects and empty objects count as absent.
fn metadata_from(raw: Value) -> Option<CallMetadata> {
    match raw {
        Value::Object(_) => serde_json::from_value::<CallMetadata>(raw)
            .ok()
            .filter(|m| !m.is_empty()),
        _ => None,
    }
}

impl WebhookEnvelope {
    pub fn into_event(self) -> Result<VogentEvent, serde_json::Error> {
        if self.event != EXTRACTOR_EVENT {
            let dial_id = self
                .payload
                .get("dial_id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            return Ok(VogentEvent::Ignored {
                event: self.event,
                dial_id,
            });
        }

        let raw = match self.payload {
            Value::Null => Value::Object(Map::new()),
            raw => raw,
        };
        let mut payload: ExtractorPayload = serde_json::from_value(raw)?;
        let metadata = metadata_from(self.metadata)
            .or_else(|| metadata_from(payload.metadata.take()))
            .unwrap_or_default();
        Ok(VogentEvent::Extractor { payload, metadata })
    }
}

impl ForwardedPayload {
    pub fn new(payload: ExtractorPayload, metadata: CallMetadata) -> Self {
        Self {
            data: payload.ai_result.to_string(),
            lead_id: metadata.lead_id,
            batch_id: metadata.batch_id,
            resume_url: metadata.resume_url,
            dial_id: payload.dial_id,
            extra: metadata.extra,
        }
    }
}
