//! Transcript Extractor backed by an LLM provider

use std::sync::Arc;

use async_trait::async_trait;

use tradeline::{
    ChatMessage, CompletionOptions, DomainError, EnquirySummary, LlmProvider, TranscriptExtractor,
};

use super::strip_code_fence;

pub struct LlmTranscriptExtractor {
    llm: Arc<dyn LlmProvider>,
}

impl LlmTranscriptExtractor {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

fn extraction_prompt(sources: [&str; 3]) -> String {
    format!(
        r#"You are a data extraction assistant.

SOURCE 1 (Initial Request):
"{}"

SOURCE 2 (Customer Details Section):
"{}"

SOURCE 3 (Final Follow-up):
"{}"

INSTRUCTIONS:
- Extract 'details' (the job description) primarily from SOURCE 1 and SOURCE 3.
- Extract 'customerdetails' (name, phone, address, email) primarily from SOURCE 2.
- If a field is missing, use null. Do not hallucinate data.
- Reply with a single JSON object:
  {{"details": string, "customerdetails": {{"name": string|null, "phone": string|null, "address": string|null, "email": string|null}}}}"#,
        sources[0], sources[1], sources[2]
    )
}

fn parse_summary(text: &str) -> Result<EnquirySummary, DomainError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| DomainError::ExternalService(format!("Unparseable extraction: {e}")))
}

#[async_trait]
impl TranscriptExtractor for LlmTranscriptExtractor {
    async fn extract(&self, sources: [&str; 3]) -> Result<EnquirySummary, DomainError> {
        let messages = vec![ChatMessage::user(extraction_prompt(sources))];
        let response = self
            .llm
            .complete(&messages, &CompletionOptions::json())
            .await?;

        parse_summary(&response.content)
    }
}
