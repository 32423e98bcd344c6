//! Transcript Extractor Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, EnquirySummary};

/// Structured summary extraction over captured step texts
#[async_trait]
pub trait TranscriptExtractor: Send + Sync {
    /// Extract a summary from the first three step texts of a call
    ///
    /// Missing steps are passed as empty strings.
    async fn extract(&self, sources: [&str; 3]) -> Result<EnquirySummary, DomainError>;
}
