//! Callback - Inbound provider webhook payloads
//!
//! The provider posts `application/x-www-form-urlencoded` bodies by default;
//! some tooling replays them as JSON. Both are accepted, field names are
//! lower-cased, and a body that fails to parse yields an empty field set
//! rather than a rejection.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;

use tradeline::CallerInput;

/// Normalized callback fields plus the `step` query discriminator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackForm {
    fields: HashMap<String, String>,
    step: Option<String>,
}

impl CallbackForm {
    pub fn parse(body: &[u8], is_json: bool, query: Option<&str>) -> Self {
        let fields = if is_json {
            parse_json_fields(body)
        } else {
            url::form_urlencoded::parse(body)
                .map(|(k, v)| (k.to_lowercase(), v.into_owned()))
                .collect()
        };

        let step = query.and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(k, _)| k == "step")
                .map(|(_, v)| v.into_owned())
        });

        Self { fields, step }
    }

    /// Field value by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    /// Field value, treating blank as missing
    fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    pub fn call_sid(&self) -> Option<&str> {
        self.non_empty("callsid")
    }

    pub fn from(&self) -> &str {
        self.get("from").unwrap_or("")
    }

    pub fn to(&self) -> &str {
        self.get("to").unwrap_or("")
    }

    pub fn speech(&self) -> CallerInput {
        CallerInput::from_field(self.get("speechresult"))
    }

    pub fn digits(&self) -> Option<&str> {
        self.non_empty("digits")
    }

    pub fn recording_url(&self) -> &str {
        self.get("recordingurl").unwrap_or("")
    }

    pub fn recording_status(&self) -> &str {
        self.get("recordingstatus").unwrap_or("")
    }

    pub fn transcription_text(&self) -> Option<&str> {
        self.non_empty("transcriptiontext")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn parse_json_fields(body: &[u8]) -> HashMap<String, String> {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return HashMap::new();
    };

    map.into_iter()
        .filter_map(|(k, v)| {
            let value = match v {
                Value::String(s) => s,
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
                other => other.to_string(),
            };
            Some((k.to_lowercase(), value))
        })
        .collect()
}

#[axum::async_trait]
impl<S> FromRequest<S> for CallbackForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(|q| q.to_string());
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        let body = match Bytes::from_request(req, state).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Unreadable callback body: {}", e);
                Bytes::new()
            }
        };

        Ok(Self::parse(&body, is_json, query.as_deref()))
    }
}
