//! LLM-backed services
//!
//! - assistant: the virtual receptionist behind the `va-*` webhooks
//! - extractor: structured summaries for the polished call view

pub mod assistant;
pub mod extractor;

use async_trait::async_trait;
use tradeline::{ChatMessage, CompletionOptions, CompletionResponse, DomainError, LlmProvider};

/// Stand-in provider when no LLM credentials are configured
pub struct UnconfiguredLlm;

#[async_trait]
impl LlmProvider for UnconfiguredLlm {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, DomainError> {
        Err(DomainError::ExternalService(
            "No LLM provider configured (set GEMINI_API_KEY)".to_string(),
        ))
    }

    fn model_id(&self) -> &str {
        "none"
    }
}

/// Strip a markdown code fence the model sometimes wraps JSON in
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
