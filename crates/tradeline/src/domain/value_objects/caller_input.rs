//! Caller input and agent turn values

use serde::{Deserialize, Serialize};

use crate::domain::entities::CollectedEnquiry;

/// What a gather callback captured from the caller.
///
/// The provider fires the gather action even when nothing was heard, in which
/// case the speech field is missing entirely. That is kept apart from a
/// speech field that is present but blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerInput {
    /// No speech field on the callback (timeout)
    Absent,
    /// Speech field present but blank
    Empty,
    /// Captured utterance, trimmed
    Speech(String),
}

impl CallerInput {
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            None => CallerInput::Absent,
            Some(text) if text.trim().is_empty() => CallerInput::Empty,
            Some(text) => CallerInput::Speech(text.trim().to_string()),
        }
    }

    pub fn speech(&self) -> Option<&str> {
        match self {
            CallerInput::Speech(text) => Some(text),
            _ => None,
        }
    }
}

/// One turn sent to the conversational agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentInput {
    /// Call just connected; the agent should greet the caller
    CallStarted,
    /// The caller said something
    Utterance(String),
    /// The caller said nothing before the gather timed out
    Silence,
}

impl AgentInput {
    /// Marker text used when the caller stayed silent
    pub const SILENCE_MARKER: &'static str = "[The caller was silent and did not say anything]";

    pub fn from_caller(input: &CallerInput) -> Self {
        match input {
            CallerInput::Speech(text) => AgentInput::Utterance(text.clone()),
            CallerInput::Absent | CallerInput::Empty => AgentInput::Silence,
        }
    }
}

/// The agent's reply for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTurn {
    /// Text to speak back to the caller
    pub response_text: String,
    /// Set once the agent has collected the enquiry; ends the call
    pub enquiry_submitted: bool,
    /// Details to persist and publish, present when `enquiry_submitted`
    pub enquiry: Option<CollectedEnquiry>,
}

impl AgentTurn {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            response_text: text.into(),
            enquiry_submitted: false,
            enquiry: None,
        }
    }

    pub fn finished(text: impl Into<String>, enquiry: CollectedEnquiry) -> Self {
        Self {
            response_text: text.into(),
            enquiry_submitted: true,
            enquiry: Some(enquiry),
        }
    }
}
