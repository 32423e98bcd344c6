//! Call Record Store Port
//!
//! Abstract interface for CallRecord persistence.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, CallRecord, RecordUpdate};

/// Repository interface for CallRecord entities
///
/// Implementations must merge concurrent updates for the same session
/// without losing appended steps or moving status backwards.
#[async_trait]
pub trait CallRecordStore: Send + Sync {
    /// Merge `update` into the record, creating it if absent
    ///
    /// Returns the record as persisted after the merge.
    async fn upsert(
        &self,
        session_id: &str,
        update: RecordUpdate,
    ) -> Result<CallRecord, DomainError>;

    /// Find a record by session id; a missing record is `Ok(None)`
    async fn get(&self, session_id: &str) -> Result<Option<CallRecord>, DomainError>;

    /// Every record, in no particular order
    async fn list(&self) -> Result<Vec<CallRecord>, DomainError>;
}
