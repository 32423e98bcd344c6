//! Call Application Service (Use Case)
//!
//! Read side of the call store: the raw record list and the extracted
//! summaries shown on the debug surface.

use std::sync::Arc;

use tradeline::{CallRecord, CallRecordStore, DomainError, EnquirySummary, TranscriptExtractor};

/// Application service for call record queries
pub struct CallService {
    store: Arc<dyn CallRecordStore>,
    extractor: Arc<dyn TranscriptExtractor>,
}

impl CallService {
    pub fn new(store: Arc<dyn CallRecordStore>, extractor: Arc<dyn TranscriptExtractor>) -> Self {
        Self { store, extractor }
    }

    /// Every persisted call
    pub async fn list_calls(&self) -> Result<Vec<CallRecord>, DomainError> {
        self.store.list().await
    }

    /// Summaries for every call; calls whose extraction fails are left out
    pub async fn polished_calls(&self) -> Result<Vec<EnquirySummary>, DomainError> {
        let records = self.store.list().await?;
        if records.is_empty() {
            return Err(DomainError::NoCalls);
        }

        let mut summaries = Vec::with_capacity(records.len());
        for record in &records {
            let sources = [record.step_text(0), record.step_text(1), record.step_text(2)];
            match self.extractor.extract(sources).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    tracing::warn!(session_id = %record.session_id, "Extraction failed: {}", e);
                }
            }
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tradeline::{ConversationStep, CustomerDetails, RecordUpdate};

    use crate::adapters::InMemoryCallStore;

    /// Fails for calls whose first step mentions "garbled"
    struct FirstStepExtractor;

    #[async_trait]
    impl TranscriptExtractor for FirstStepExtractor {
        async fn extract(&self, sources: [&str; 3]) -> Result<EnquirySummary, DomainError> {
            if sources[0].contains("garbled") {
                return Err(DomainError::ExternalService("unparseable".into()));
            }
            Ok(EnquirySummary {
                details: sources[0].to_string(),
                customerdetails: CustomerDetails {
                    address: Some(sources[1].to_string()),
                    ..Default::default()
                },
            })
        }
    }

    fn service(store: Arc<InMemoryCallStore>) -> CallService {
        CallService::new(store, Arc::new(FirstStepExtractor))
    }

    #[tokio::test]
    async fn test_polished_over_no_calls() {
        let service = service(Arc::new(InMemoryCallStore::new()));
        assert!(matches!(
            service.polished_calls().await,
            Err(DomainError::NoCalls)
        ));
    }

    #[tokio::test]
    async fn test_polished_omits_failed_extractions() {
        let store = Arc::new(InMemoryCallStore::new());
        store
            .upsert(
                "CA1",
                RecordUpdate::new()
                    .append_step(ConversationStep::new("job-details", "fix my switchboard"))
                    .append_step(ConversationStep::new("address-details", "42 Main St")),
            )
            .await
            .unwrap();
        store
            .upsert(
                "CA2",
                RecordUpdate::new().append_step(ConversationStep::new("job-details", "garbled")),
            )
            .await
            .unwrap();

        let service = service(store);
        let summaries = service.polished_calls().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].details, "fix my switchboard");
        assert_eq!(summaries[0].customerdetails.address.as_deref(), Some("42 Main St"));
        assert_eq!(service.list_calls().await.unwrap().len(), 2);
    }
}
