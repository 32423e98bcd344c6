//! VoiceReply - Provider-neutral call control decision
//!
//! The conversation driver answers every callback with a `VoiceReply`.
//! Rendering it into provider markup happens at the HTTP edge and adds no
//! state of its own.

use serde::{Deserialize, Serialize};

/// What a gather collects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatherInput {
    Speech,
    Digits { num_digits: u8 },
}

/// A single call-control instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceVerb {
    /// Speak text to the caller
    Say(String),
    /// Collect input, optionally speaking a prompt while listening
    Gather {
        input: GatherInput,
        action: String,
        prompt: Option<String>,
        hints: Option<String>,
        action_on_empty_result: bool,
    },
    /// Record a voicemail with provider-side transcription
    Record {
        action: String,
        recording_status_callback: String,
        transcribe_callback: String,
    },
    /// Start a background recording of the whole call
    StartRecording { status_callback: String },
    /// Connect the caller to another number
    Dial(String),
    /// Fetch the next instructions from another URL
    Redirect(String),
    Hangup,
}

/// Ordered list of verbs returned for one callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceReply {
    pub verbs: Vec<VoiceVerb>,
}

impl VoiceReply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(VoiceVerb::Say(text.into()));
        self
    }

    /// Speak `prompt` while listening for speech, posting the result to `action`
    pub fn gather_speech(
        mut self,
        action: impl Into<String>,
        prompt: impl Into<String>,
        hints: Option<String>,
    ) -> Self {
        self.verbs.push(VoiceVerb::Gather {
            input: GatherInput::Speech,
            action: action.into(),
            prompt: Some(prompt.into()),
            hints,
            action_on_empty_result: true,
        });
        self
    }

    pub fn gather_digits(
        mut self,
        action: impl Into<String>,
        prompt: impl Into<String>,
        num_digits: u8,
    ) -> Self {
        self.verbs.push(VoiceVerb::Gather {
            input: GatherInput::Digits { num_digits },
            action: action.into(),
            prompt: Some(prompt.into()),
            hints: None,
            action_on_empty_result: false,
        });
        self
    }

    pub fn record(
        mut self,
        action: impl Into<String>,
        recording_status_callback: impl Into<String>,
        transcribe_callback: impl Into<String>,
    ) -> Self {
        self.verbs.push(VoiceVerb::Record {
            action: action.into(),
            recording_status_callback: recording_status_callback.into(),
            transcribe_callback: transcribe_callback.into(),
        });
        self
    }

    pub fn start_recording(mut self, status_callback: impl Into<String>) -> Self {
        self.verbs.push(VoiceVerb::StartRecording {
            status_callback: status_callback.into(),
        });
        self
    }

    pub fn dial(mut self, number: impl Into<String>) -> Self {
        self.verbs.push(VoiceVerb::Dial(number.into()));
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(VoiceVerb::Redirect(url.into()));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(VoiceVerb::Hangup);
        self
    }

    /// Whether this reply ends the call
    pub fn ends_call(&self) -> bool {
        matches!(self.verbs.last(), Some(VoiceVerb::Hangup))
    }

    /// The action URL of the first gather, if any
    pub fn gather_action(&self) -> Option<&str> {
        self.verbs.iter().find_map(|verb| match verb {
            VoiceVerb::Gather { action, .. } => Some(action.as_str()),
            _ => None,
        })
    }

    /// All spoken text, in order (say verbs and gather prompts)
    pub fn spoken_text(&self) -> Vec<&str> {
        self.verbs
            .iter()
            .filter_map(|verb| match verb {
                VoiceVerb::Say(text) => Some(text.as_str()),
                VoiceVerb::Gather {
                    prompt: Some(prompt),
                    ..
                } => Some(prompt.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_verb_order() {
        let reply = VoiceReply::new()
            .say("Hello")
            .gather_speech("https://x/next", "Describe the job", None)
            .hangup();

        assert_eq!(reply.verbs.len(), 3);
        assert_eq!(reply.spoken_text(), vec!["Hello", "Describe the job"]);
        assert_eq!(reply.gather_action(), Some("https://x/next"));
        assert!(reply.ends_call());
    }

    #[test]
    fn test_gather_without_hangup_keeps_call_open() {
        let reply = VoiceReply::new().gather_digits("https://x/menu", "Press 1", 1);
        assert!(!reply.ends_call());
    }
}
