//! Tradeline API Client

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;

/// API Client for a running Tradeline server
pub struct TradelineClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct StepResponse {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub call_sid: String,
    pub from: String,
    pub to: String,
    pub status: String,
    pub recording_url: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepResponse>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PolishedCall {
    pub details: String,
    pub customerdetails: CustomerDetails,
}

/// The polished view answers with either summaries or an error object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PolishedOutcome {
    Calls(Vec<PolishedCall>),
    Empty { error: String },
}

/// What the caller would hear, read back from a TwiML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceResponse {
    pub spoken: Vec<String>,
    pub hangs_up: bool,
    pub dials: Option<String>,
}

impl VoiceResponse {
    pub fn from_twiml(xml: &str) -> Self {
        Self {
            spoken: element_texts(xml, "Say"),
            hangs_up: xml.contains("<Hangup/>"),
            dials: element_texts(xml, "Number").into_iter().next(),
        }
    }

    pub fn ends_call(&self) -> bool {
        self.hangs_up || self.dials.is_some()
    }
}

/// Inner text of every `<tag ...>text</tag>` occurrence
fn element_texts(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut texts = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find(&open) {
        let after_open = &rest[start + open.len()..];
        // Skip longer tag names sharing the prefix
        if !after_open.starts_with(|c: char| c == '>' || c == ' ') {
            rest = after_open;
            continue;
        }
        let Some(body_start) = after_open.find('>') else {
            break;
        };
        let body = &after_open[body_start + 1..];
        let Some(end) = body.find(&close) else {
            break;
        };
        texts.push(unescape(&body[..end]));
        rest = &body[end + close.len()..];
    }

    texts
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

impl TradelineClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.to_string()),
        }
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    async fn get_authorized(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req
            .send()
            .await
            .context("Failed to connect to Tradeline server")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        Ok(resp)
    }

    /// Raw call records, newest first
    pub async fn list_calls(&self) -> Result<Vec<CallResponse>> {
        let resp = self.get_authorized("/webhooks/voice/all-calls").await?;
        resp.json().await.context("Failed to parse response")
    }

    /// LLM-extracted summaries of every call
    pub async fn polished_calls(&self) -> Result<PolishedOutcome> {
        let resp = self
            .get_authorized("/webhooks/voice/all-calls/polished")
            .await?;
        resp.json().await.context("Failed to parse response")
    }

    /// Post a provider-style form callback and read back the TwiML reply
    pub async fn post_callback(
        &self,
        path: &str,
        step: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Result<VoiceResponse> {
        let mut url = format!("{}{}", self.base_url, path);
        if let Some(step) = step {
            url.push_str(&format!("?step={}", urlencoding::encode(step)));
        }

        let resp = self
            .client
            .post(&url)
            .form(fields)
            .send()
            .await
            .context("Failed to connect to Tradeline server")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Webhook error ({}): {}", status, body);
        }

        let xml = resp.text().await.context("Failed to read TwiML")?;
        Ok(VoiceResponse::from_twiml(&xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_response_reads_gather_prompt() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><Response><Gather input="speech" action="https://x/a?step=job-details&amp;b=1" method="POST"><Say voice="v" language="en-AU">Hi, thanks for calling Tom&apos;s Plumbing.</Say></Gather></Response>"#;
        let voice = VoiceResponse::from_twiml(xml);

        assert_eq!(voice.spoken, vec!["Hi, thanks for calling Tom's Plumbing."]);
        assert!(!voice.ends_call());
    }

    #[test]
    fn test_voice_response_detects_hangup_and_dial() {
        let hangup = VoiceResponse::from_twiml(
            "<Response><Say>Goodbye.</Say><Say>Bye &amp; thanks</Say><Hangup/></Response>",
        );
        assert_eq!(hangup.spoken, vec!["Goodbye.", "Bye & thanks"]);
        assert!(hangup.ends_call());

        let dial = VoiceResponse::from_twiml(
            "<Response><Dial><Number>+61499888777</Number></Dial></Response>",
        );
        assert_eq!(dial.dials.as_deref(), Some("+61499888777"));
        assert!(dial.ends_call());
        assert!(dial.spoken.is_empty());
    }

    #[test]
    fn test_polished_outcome_shapes() {
        let empty: PolishedOutcome =
            serde_json::from_str(r#"{"error":"No calls found"}"#).unwrap();
        assert!(matches!(empty, PolishedOutcome::Empty { ref error } if error == "No calls found"));

        let calls: PolishedOutcome = serde_json::from_str(
            r#"[{"details":"Fix switchboard","customerdetails":{"name":null,"phone":"+614","address":"42 Main St","email":null}}]"#,
        )
        .unwrap();
        match calls {
            PolishedOutcome::Calls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].customerdetails.address.as_deref(), Some("42 Main St"));
            }
            PolishedOutcome::Empty { .. } => panic!("expected calls"),
        }
    }
}
