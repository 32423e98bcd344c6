//! CallStatus - Call lifecycle stage

use serde::{Deserialize, Serialize};

/// Lifecycle of a call record. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    /// Inbound call event seen, nothing captured yet
    Received,
    /// At least one conversation step captured
    Processing,
    /// Conversation complete, transcript computed
    Processed,
}

impl CallStatus {
    /// Position along the lifecycle, used for monotonic merges
    pub fn rank(self) -> i16 {
        match self {
            CallStatus::Received => 0,
            CallStatus::Processing => 1,
            CallStatus::Processed => 2,
        }
    }

    /// The later of two stages
    pub fn advance(self, next: CallStatus) -> CallStatus {
        if next.rank() > self.rank() {
            next
        } else {
            self
        }
    }

    pub fn is_terminal(self) -> bool {
        self == CallStatus::Processed
    }
}

impl Default for CallStatus {
    fn default() -> Self {
        CallStatus::Received
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Received => write!(f, "RECEIVED"),
            CallStatus::Processing => write!(f, "PROCESSING"),
            CallStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RECEIVED" => Ok(CallStatus::Received),
            "PROCESSING" => Ok(CallStatus::Processing),
            "PROCESSED" => Ok(CallStatus::Processed),
            _ => Err(format!("Unknown call status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_never_regresses() {
        assert_eq!(
            CallStatus::Processed.advance(CallStatus::Received),
            CallStatus::Processed
        );
        assert_eq!(
            CallStatus::Received.advance(CallStatus::Processing),
            CallStatus::Processing
        );
        assert_eq!(
            CallStatus::Processing.advance(CallStatus::Processing),
            CallStatus::Processing
        );
    }

    #[test]
    fn test_round_trips_through_text() {
        for status in [
            CallStatus::Received,
            CallStatus::Processing,
            CallStatus::Processed,
        ] {
            let parsed: CallStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("VA_PROCESSED".parse::<CallStatus>().is_err());
    }
}
