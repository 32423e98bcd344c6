//! PostgreSQL implementation of CallRecordStore
//!
//! Each upsert is one `INSERT .. ON CONFLICT DO UPDATE` statement. The merge
//! rules are expressed in SQL against the row as currently stored, so two
//! callbacks for the same session racing each other both land.

use async_trait::async_trait;
use sqlx::PgPool;

use tradeline::{
    CallRecord, CallRecordStore, CallStatus, ConversationStep, DomainError, FieldOp, RecordUpdate,
};

pub struct PgCallStore {
    pool: PgPool,
}

impl PgCallStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct CallRecordRow {
    session_id: String,
    from_address: String,
    to_address: String,
    status: String,
    recording_url: Option<String>,
    recording_status: Option<String>,
    steps: serde_json::Value,
    transcript: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CallRecordRow> for CallRecord {
    fn from(row: CallRecordRow) -> Self {
        let steps: Vec<ConversationStep> = serde_json::from_value(row.steps).unwrap_or_else(|e| {
            tracing::warn!(session_id = %row.session_id, "Unreadable steps column: {}", e);
            Vec::new()
        });

        Self {
            status: row.status.parse().unwrap_or_default(),
            session_id: row.session_id,
            from_address: row.from_address,
            to_address: row.to_address,
            recording_url: row.recording_url,
            recording_status: row.recording_status,
            steps,
            transcript: row.transcript,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Bind values for one upsert, folded from the update's field operations
#[derive(Debug, Default, PartialEq)]
struct UpsertBinds {
    from_address: Option<String>,
    to_address: Option<String>,
    status: Option<CallStatus>,
    recording_url: Option<String>,
    recording_status: Option<String>,
    transcript: Option<String>,
    steps: Vec<ConversationStep>,
}

impl UpsertBinds {
    fn fold(update: &RecordUpdate) -> Self {
        let mut binds = Self::default();
        for op in update.ops() {
            match op {
                FieldOp::SetAddresses { from, to } => {
                    if binds.from_address.is_none() && !from.is_empty() {
                        binds.from_address = Some(from.clone());
                    }
                    if binds.to_address.is_none() && !to.is_empty() {
                        binds.to_address = Some(to.clone());
                    }
                }
                FieldOp::AdvanceStatus(status) => {
                    binds.status = Some(match binds.status {
                        Some(current) => current.advance(*status),
                        None => *status,
                    });
                }
                FieldOp::SetRecording { url, status } => {
                    if !url.is_empty() {
                        binds.recording_url = Some(url.clone());
                    }
                    if !status.is_empty() {
                        binds.recording_status = Some(status.clone());
                    }
                }
                FieldOp::SetTranscript(transcript) => {
                    binds.transcript = Some(transcript.clone());
                }
                FieldOp::AppendSteps(steps) => binds.steps.extend(steps.iter().cloned()),
            }
        }
        binds
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO call_records
        (session_id, from_address, to_address, status, status_rank,
         recording_url, recording_status, steps, transcript)
    VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), $4, $5, $6, $7, $8, $9)
    ON CONFLICT (session_id) DO UPDATE SET
        from_address = CASE WHEN call_records.from_address = ''
            THEN EXCLUDED.from_address ELSE call_records.from_address END,
        to_address = CASE WHEN call_records.to_address = ''
            THEN EXCLUDED.to_address ELSE call_records.to_address END,
        status = CASE WHEN EXCLUDED.status_rank > call_records.status_rank
            THEN EXCLUDED.status ELSE call_records.status END,
        status_rank = GREATEST(call_records.status_rank, EXCLUDED.status_rank),
        recording_url = COALESCE(EXCLUDED.recording_url, call_records.recording_url),
        recording_status = COALESCE(EXCLUDED.recording_status, call_records.recording_status),
        steps = call_records.steps || EXCLUDED.steps,
        transcript = COALESCE(EXCLUDED.transcript, call_records.transcript),
        updated_at = NOW()
    RETURNING *
"#;

#[async_trait]
impl CallRecordStore for PgCallStore {
    async fn upsert(
        &self,
        session_id: &str,
        update: RecordUpdate,
    ) -> Result<CallRecord, DomainError> {
        let binds = UpsertBinds::fold(&update);
        // An update without a status leaves rank 0, which never wins the GREATEST
        let status = binds.status.unwrap_or_default();
        let steps_json = serde_json::to_value(&binds.steps)
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let row = sqlx::query_as::<_, CallRecordRow>(UPSERT_SQL)
            .bind(session_id)
            .bind(&binds.from_address)
            .bind(&binds.to_address)
            .bind(status.to_string())
            .bind(status.rank())
            .bind(&binds.recording_url)
            .bind(&binds.recording_status)
            .bind(&steps_json)
            .bind(&binds.transcript)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.into())
    }

    async fn get(&self, session_id: &str) -> Result<Option<CallRecord>, DomainError> {
        let row = sqlx::query_as::<_, CallRecordRow>(
            "SELECT * FROM call_records WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<CallRecord>, DomainError> {
        let rows = sqlx::query_as::<_, CallRecordRow>(
            "SELECT * FROM call_records ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_keeps_highest_status_and_all_steps() {
        let update = RecordUpdate::new()
            .status(CallStatus::Processed)
            .append_step(ConversationStep::new("job-details", "a"))
            .status(CallStatus::Processing)
            .append_step(ConversationStep::new("address-details", "b"));

        let binds = UpsertBinds::fold(&update);
        assert_eq!(binds.status, Some(CallStatus::Processed));
        assert_eq!(binds.steps.len(), 2);
        assert_eq!(binds.steps[1].name, "address-details");
    }

    #[test]
    fn test_fold_ignores_blank_values() {
        let update = RecordUpdate::new()
            .addresses("", "+61400555666")
            .recording("", "completed");

        let binds = UpsertBinds::fold(&update);
        assert_eq!(binds.from_address, None);
        assert_eq!(binds.to_address.as_deref(), Some("+61400555666"));
        assert_eq!(binds.recording_url, None);
        assert_eq!(binds.recording_status.as_deref(), Some("completed"));
        assert_eq!(binds.status, None);
    }

    #[test]
    fn test_row_conversion_tolerates_bad_steps() {
        let now = chrono::Utc::now();
        let row = CallRecordRow {
            session_id: "CA1".to_string(),
            from_address: "+61411111111".to_string(),
            to_address: "+61400555666".to_string(),
            status: "PROCESSING".to_string(),
            recording_url: None,
            recording_status: None,
            steps: serde_json::json!({"not": "an array"}),
            transcript: None,
            created_at: now,
            updated_at: now,
        };

        let record: CallRecord = row.into();
        assert_eq!(record.status, CallStatus::Processing);
        assert!(record.steps.is_empty());
    }
}
