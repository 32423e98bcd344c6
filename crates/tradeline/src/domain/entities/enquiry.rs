//! Enquiry - What leaves the system once a call completes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::call_record::{CallRecord, ConversationStep};
use crate::domain::value_objects::CallStatus;

/// Body POSTed to the enquiry intake endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryPayload {
    /// Unique per publish attempt
    pub delivery_id: Uuid,
    pub call_sid: String,
    pub from: String,
    pub to: String,
    pub status: CallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_status: Option<String>,
    pub steps: Vec<ConversationStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Set when the assistant collected the details itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<EnquirySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl EnquiryPayload {
    pub fn from_record(record: &CallRecord) -> Self {
        Self {
            delivery_id: Uuid::new_v4(),
            call_sid: record.session_id.clone(),
            from: record.from_address.clone(),
            to: record.to_address.clone(),
            status: record.status,
            recording_url: record.recording_url.clone(),
            recording_status: record.recording_status.clone(),
            steps: record.steps.clone(),
            transcript: record.transcript.clone(),
            summary: None,
            additional_notes: None,
            published_at: Utc::now(),
        }
    }

    /// Attach the details the assistant collected during the call
    pub fn with_collected(mut self, enquiry: CollectedEnquiry) -> Self {
        self.summary = Some(enquiry.summary);
        self.additional_notes = enquiry
            .additional_notes
            .filter(|notes| !notes.trim().is_empty());
        self
    }

    /// Key the downstream consumer can deduplicate repeated terminal callbacks on
    pub fn idempotency_key(&self) -> String {
        format!("{}:final-notes", self.call_sid)
    }
}

/// What the assistant gathered before ending the call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedEnquiry {
    pub summary: EnquirySummary,
    pub additional_notes: Option<String>,
}

/// Structured summary extracted from a call's first three steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquirySummary {
    /// Job description
    pub details: String,
    pub customerdetails: CustomerDetails,
}

/// Contact details; any field may be missing from the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RecordUpdate;

    #[test]
    fn test_payload_carries_record_fields() {
        let mut record = CallRecord::new("CA1");
        record.apply(
            &RecordUpdate::new()
                .addresses("+61411111111", "+61400555666")
                .append_step(ConversationStep::new("job-details", "fix my switchboard"))
                .transcript("fix my switchboard")
                .status(CallStatus::Processed),
        );

        let payload = EnquiryPayload::from_record(&record);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["callSid"], "CA1");
        assert_eq!(json["from"], "+61411111111");
        assert_eq!(json["status"], "PROCESSED");
        assert_eq!(json["steps"][0]["name"], "job-details");
        assert_eq!(json["transcript"], "fix my switchboard");
        assert!(json.get("recordingUrl").is_none());
        assert_eq!(payload.idempotency_key(), "CA1:final-notes");
    }

    #[test]
    fn test_collected_payload_keeps_record_and_drops_blank_notes() {
        let mut record = CallRecord::new("CA2");
        record.apply(
            &RecordUpdate::new()
                .append_step(ConversationStep::new("caller-turn", "rewire the garage"))
                .transcript("rewire the garage")
                .status(CallStatus::Processed),
        );
        let collected = CollectedEnquiry {
            summary: EnquirySummary {
                details: "rewire the garage".to_string(),
                customerdetails: CustomerDetails {
                    name: Some("Sam".to_string()),
                    ..Default::default()
                },
            },
            additional_notes: Some("  ".into()),
        };

        let payload = EnquiryPayload::from_record(&record).with_collected(collected);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["summary"]["details"], "rewire the garage");
        assert_eq!(json["transcript"], "rewire the garage");
        assert_eq!(json["steps"].as_array().map(|s| s.len()), Some(1));
        assert!(json.get("additionalNotes").is_none());
        assert_eq!(json["status"], "PROCESSED");
    }

    #[test]
    fn test_summary_accepts_null_contact_fields() {
        let summary: EnquirySummary = serde_json::from_str(
            r#"{"details":"switchboard upgrade","customerdetails":{"name":null,"phone":"0400","address":null}}"#,
        )
        .unwrap();
        assert_eq!(summary.customerdetails.phone.as_deref(), Some("0400"));
        assert!(summary.customerdetails.email.is_none());
    }
}
