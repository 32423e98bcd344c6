//! CallRecord - One phone call, correlated across callbacks
//!
//! Pure domain entity without infrastructure dependencies.
//!
//! A record is never written wholesale. Every change is expressed as a
//! `RecordUpdate`, a list of tagged field operations, and each store backend
//! applies those operations with the same merge rules:
//!
//! - `AppendSteps` appends to `steps` against the latest persisted value
//! - `AdvanceStatus` only ever moves `status` forward
//! - `SetAddresses` fills `from`/`to` once and leaves them alone afterwards
//! - `SetRecording` and `SetTranscript` overwrite (last write wins)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CallStatus, StepName};

/// One captured conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStep {
    /// Slot identifier, e.g. `job-details`
    pub name: String,
    /// Raw captured utterance
    pub text: String,
}

impl ConversationStep {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Step captured for a scripted intake slot
    pub fn for_slot(slot: StepName, text: impl Into<String>) -> Self {
        Self::new(slot.as_str(), text)
    }
}

/// CallRecord - Everything known about one call session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Provider-issued session id (Twilio CallSid)
    #[serde(rename = "callSid")]
    pub session_id: String,
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(rename = "to")]
    pub to_address: String,
    pub status: CallStatus,
    pub recording_url: Option<String>,
    pub recording_status: Option<String>,
    #[serde(default)]
    pub steps: Vec<ConversationStep>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallRecord {
    /// Materialize an empty record for a session seen for the first time
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            from_address: String::new(),
            to_address: String::new(),
            status: CallStatus::default(),
            recording_url: None,
            recording_status: None,
            steps: Vec::new(),
            transcript: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update into this record
    pub fn apply(&mut self, update: &RecordUpdate) {
        for op in update.ops() {
            match op {
                FieldOp::SetAddresses { from, to } => {
                    if self.from_address.is_empty() {
                        self.from_address = from.clone();
                    }
                    if self.to_address.is_empty() {
                        self.to_address = to.clone();
                    }
                }
                FieldOp::AdvanceStatus(status) => {
                    self.status = self.status.advance(*status);
                }
                FieldOp::SetRecording { url, status } => {
                    if !url.is_empty() {
                        self.recording_url = Some(url.clone());
                    }
                    if !status.is_empty() {
                        self.recording_status = Some(status.clone());
                    }
                }
                FieldOp::SetTranscript(transcript) => {
                    self.transcript = Some(transcript.clone());
                }
                FieldOp::AppendSteps(steps) => {
                    self.steps.extend(steps.iter().cloned());
                }
            }
        }
        if !update.is_empty() {
            self.updated_at = Utc::now();
        }
    }

    /// Step texts joined in conversation order
    pub fn joined_steps(&self, separator: &str) -> String {
        self.steps
            .iter()
            .map(|step| step.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Text of the step at `index`, empty when the call never got that far
    pub fn step_text(&self, index: usize) -> &str {
        self.steps
            .get(index)
            .map(|step| step.text.as_str())
            .unwrap_or("")
    }
}

/// A single tagged field operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    SetAddresses { from: String, to: String },
    AdvanceStatus(CallStatus),
    SetRecording { url: String, status: String },
    SetTranscript(String),
    AppendSteps(Vec<ConversationStep>),
}

/// Ordered set of field operations for one upsert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    ops: Vec<FieldOp>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.ops.push(FieldOp::SetAddresses {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn status(mut self, status: CallStatus) -> Self {
        self.ops.push(FieldOp::AdvanceStatus(status));
        self
    }

    pub fn recording(mut self, url: impl Into<String>, status: impl Into<String>) -> Self {
        self.ops.push(FieldOp::SetRecording {
            url: url.into(),
            status: status.into(),
        });
        self
    }

    pub fn transcript(mut self, transcript: impl Into<String>) -> Self {
        self.ops.push(FieldOp::SetTranscript(transcript.into()));
        self
    }

    pub fn append_step(mut self, step: ConversationStep) -> Self {
        self.ops.push(FieldOp::AppendSteps(vec![step]));
        self
    }

    pub fn ops(&self) -> &[FieldOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_starts_received() {
        let record = CallRecord::new("CA1");
        assert_eq!(record.session_id, "CA1");
        assert_eq!(record.status, CallStatus::Received);
        assert!(record.steps.is_empty());
        assert!(record.transcript.is_none());
    }

    #[test]
    fn test_steps_append_in_order() {
        let mut record = CallRecord::new("CA1");
        record.apply(
            &RecordUpdate::new()
                .append_step(ConversationStep::for_slot(StepName::JobDetails, "fix my switchboard")),
        );
        record.apply(
            &RecordUpdate::new()
                .append_step(ConversationStep::for_slot(StepName::AddressDetails, "42 Main St")),
        );

        assert_eq!(record.steps.len(), 2);
        assert_eq!(record.steps[0].name, "job-details");
        assert_eq!(record.steps[1].text, "42 Main St");
        assert_eq!(
            record.joined_steps(" \n "),
            "fix my switchboard \n 42 Main St"
        );
    }

    #[test]
    fn test_redelivered_step_appends_rather_than_edits() {
        let mut record = CallRecord::new("CA1");
        let first = ConversationStep::for_slot(StepName::JobDetails, "leaking tap");
        let again = ConversationStep::for_slot(StepName::JobDetails, "leaking tap in kitchen");
        record.apply(&RecordUpdate::new().append_step(first.clone()));
        record.apply(&RecordUpdate::new().append_step(again.clone()));

        assert_eq!(record.steps, vec![first, again]);
    }

    #[test]
    fn test_status_is_monotonic() {
        let mut record = CallRecord::new("CA1");
        record.apply(&RecordUpdate::new().status(CallStatus::Processed));
        record.apply(&RecordUpdate::new().status(CallStatus::Received));
        assert_eq!(record.status, CallStatus::Processed);
    }

    #[test]
    fn test_addresses_are_set_once() {
        let mut record = CallRecord::new("CA1");
        record.apply(&RecordUpdate::new().addresses("+61411111111", "+61400555666"));
        record.apply(&RecordUpdate::new().addresses("+61422222222", "+61499999999"));
        assert_eq!(record.from_address, "+61411111111");
        assert_eq!(record.to_address, "+61400555666");
    }

    #[test]
    fn test_recording_does_not_touch_steps() {
        let mut record = CallRecord::new("CA1");
        record.apply(
            &RecordUpdate::new().append_step(ConversationStep::for_slot(StepName::JobDetails, "x")),
        );
        record.apply(&RecordUpdate::new().recording("https://rec/1", "in-progress"));
        record.apply(&RecordUpdate::new().recording("", "completed"));

        assert_eq!(record.steps.len(), 1);
        assert_eq!(record.recording_url.as_deref(), Some("https://rec/1"));
        assert_eq!(record.recording_status.as_deref(), Some("completed"));
    }

    #[test]
    fn test_serializes_with_provider_field_names() {
        let mut record = CallRecord::new("CA1");
        record.apply(&RecordUpdate::new().addresses("+61411111111", "+61400555666"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["callSid"], "CA1");
        assert_eq!(json["from"], "+61411111111");
        assert_eq!(json["status"], "RECEIVED");
        assert!(json["steps"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_step_text_out_of_range_is_empty() {
        let record = CallRecord::new("CA1");
        assert_eq!(record.step_text(2), "");
    }
}
