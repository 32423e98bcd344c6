//! StepName - Slots of the scripted intake conversation
//!
//! The step discriminator travels with the provider: it is written into the
//! `step` query parameter of the next action URL and relayed back verbatim,
//! so no process has to remember where a call is up to.

use serde::{Deserialize, Serialize};

/// Step name used for assistant-branch utterances
pub const CALLER_TURN_STEP: &str = "caller-turn";

/// Step name used for IVR voicemail transcriptions
pub const VOICEMAIL_STEP: &str = "voicemail";

/// One slot of the three-step intake script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepName {
    JobDetails,
    AddressDetails,
    FinalNotes,
}

impl StepName {
    /// The step the script opens with
    pub fn first() -> Self {
        StepName::JobDetails
    }

    /// The step that follows this one, `None` for the terminal step
    pub fn next(self) -> Option<StepName> {
        match self {
            StepName::JobDetails => Some(StepName::AddressDetails),
            StepName::AddressDetails => Some(StepName::FinalNotes),
            StepName::FinalNotes => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepName::JobDetails => "job-details",
            StepName::AddressDetails => "address-details",
            StepName::FinalNotes => "final-notes",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job-details" => Ok(StepName::JobDetails),
            "address-details" => Ok(StepName::AddressDetails),
            "final-notes" => Ok(StepName::FinalNotes),
            _ => Err(format!("Unknown step: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_order() {
        let mut order = vec![StepName::first()];
        while let Some(next) = order.last().and_then(|s| s.next()) {
            order.push(next);
        }
        assert_eq!(
            order,
            vec![
                StepName::JobDetails,
                StepName::AddressDetails,
                StepName::FinalNotes
            ]
        );
        assert_eq!(StepName::FinalNotes.next(), None);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(
            "address-details".parse::<StepName>(),
            Ok(StepName::AddressDetails)
        );
        assert!("Job-Details".parse::<StepName>().is_err());
        assert!("".parse::<StepName>().is_err());
    }
}
