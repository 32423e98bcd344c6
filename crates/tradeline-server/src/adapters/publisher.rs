//! HTTP Enquiry Publisher
//!
//! Posts finished enquiries to the downstream intake API using reqwest.

use async_trait::async_trait;
use reqwest::Client;

use tradeline::{DomainError, EnquiryPayload, EnquiryPublisher};

use crate::config::EnquiriesApiConfig;

const USER_AGENT: &str = concat!("tradeline/", env!("CARGO_PKG_VERSION"));

/// HTTP implementation of EnquiryPublisher
pub struct HttpEnquiryPublisher {
    client: Client,
    config: EnquiriesApiConfig,
}

impl HttpEnquiryPublisher {
    pub fn new(config: EnquiriesApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn sign_payload(secret: &str, payload: &[u8]) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        type HmacSha256 = Hmac<Sha256>;

        // HMAC accepts keys of any length, so this cannot fail
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(payload);
        let bytes = mac.finalize().into_bytes();

        // Return hex-encoded signature with sha256= prefix
        format!("sha256={}", hex::encode(bytes))
    }
}

#[async_trait]
impl EnquiryPublisher for HttpEnquiryPublisher {
    async fn publish(&self, payload: &EnquiryPayload) -> Result<(), DomainError> {
        let Some(base_url) = &self.config.url else {
            tracing::warn!(
                session_id = %payload.call_sid,
                "ENQUIRIES_API_URL not configured, skipping publish"
            );
            return Ok(());
        };

        let body = serde_json::to_vec(payload).map_err(|e| {
            DomainError::ExternalService(format!("Failed to serialize payload: {e}"))
        })?;

        let mut request = self
            .client
            .post(format!("{}/enquiries", base_url))
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("Idempotency-Key", payload.idempotency_key())
            .timeout(self.config.timeout);

        if let Some(api_key) = &self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        if let Some(secret) = &self.config.signing_secret {
            request = request.header("X-Tradeline-Signature", Self::sign_payload(secret, &body));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("Enquiry publish failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "No response body".to_string());
            return Err(DomainError::ExternalService(format!(
                "Enquiry API returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        tracing::info!(
            session_id = %payload.call_sid,
            delivery_id = %payload.delivery_id,
            "Enquiry published"
        );
        Ok(())
    }
}
