//! BusinessProfile - The tradie a virtual number belongs to

use serde::{Deserialize, Serialize};

/// Read-only reference data looked up by the dialled number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: String,
    /// Name spoken in greetings
    pub name: String,
    /// Number callers dial, digits and `+` only
    pub virtual_number: String,
    /// Real mobile calls are forwarded to
    pub forward_number: String,
}

impl BusinessProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        virtual_number: impl Into<String>,
        forward_number: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            virtual_number: normalize_number(&virtual_number.into()),
            forward_number: forward_number.into(),
        }
    }

    /// Whether `number` reaches this business
    pub fn answers(&self, number: &str) -> bool {
        normalize_number(&self.virtual_number) == normalize_number(number)
    }
}

/// Strip formatting so "+61 400 555 666" and "+61400555666" compare equal
pub fn normalize_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}
