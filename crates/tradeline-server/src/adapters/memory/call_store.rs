//! In-memory implementation of CallRecordStore

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tradeline::{CallRecord, CallRecordStore, DomainError, RecordUpdate};

/// Records held in a map; every upsert is a read-modify-write under the
/// write lock, so updates for one session are applied one at a time.
#[derive(Default)]
pub struct InMemoryCallStore {
    records: RwLock<HashMap<String, CallRecord>>,
}

impl InMemoryCallStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CallRecordStore for InMemoryCallStore {
    async fn upsert(
        &self,
        session_id: &str,
        update: RecordUpdate,
    ) -> Result<CallRecord, DomainError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(session_id.to_string())
            .or_insert_with(|| CallRecord::new(session_id));
        record.apply(&update);
        Ok(record.clone())
    }

    async fn get(&self, session_id: &str) -> Result<Option<CallRecord>, DomainError> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn list(&self) -> Result<Vec<CallRecord>, DomainError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tradeline::{CallStatus, ConversationStep};

    #[tokio::test]
    async fn test_missing_record_is_none() {
        let store = InMemoryCallStore::new();
        assert!(store.get("CA-missing").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let store = InMemoryCallStore::new();
        store
            .upsert(
                "CA1",
                RecordUpdate::new()
                    .addresses("+61411111111", "+61400555666")
                    .status(CallStatus::Received),
            )
            .await
            .unwrap();
        let merged = store
            .upsert(
                "CA1",
                RecordUpdate::new()
                    .append_step(ConversationStep::new("job-details", "fix my switchboard"))
                    .status(CallStatus::Processing),
            )
            .await
            .unwrap();

        assert_eq!(merged.from_address, "+61411111111");
        assert_eq!(merged.status, CallStatus::Processing);
        assert_eq!(merged.steps.len(), 1);
        assert_eq!(store.get("CA1").await.unwrap(), Some(merged));
    }

    #[tokio::test]
    async fn test_concurrent_recording_and_step_both_land() {
        let store = Arc::new(InMemoryCallStore::new());

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let update = if i % 2 == 0 {
                    RecordUpdate::new().append_step(ConversationStep::new("caller-turn", format!("turn {i}")))
                } else {
                    RecordUpdate::new().recording(format!("https://rec/{i}"), "in-progress")
                };
                store.upsert("CA1", update).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = store.get("CA1").await.unwrap().unwrap();
        assert_eq!(record.steps.len(), 10);
        assert!(record.recording_url.is_some());
        assert_eq!(record.recording_status.as_deref(), Some("in-progress"));
    }
}
