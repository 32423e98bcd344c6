//! Call - Debug view DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tradeline::{CallRecord, EnquirySummary};

/// One captured conversation step
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepResponse {
    pub name: String,
    pub text: String,
}

/// Call record as exposed on the debug surface
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallRecordResponse {
    pub call_sid: String,
    pub from: String,
    pub to: String,
    /// RECEIVED, PROCESSING or PROCESSED
    pub status: String,
    pub recording_url: Option<String>,
    pub recording_status: Option<String>,
    pub steps: Vec<StepResponse>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallRecordResponse {
    pub fn from_domain(record: CallRecord) -> Self {
        Self {
            call_sid: record.session_id,
            from: record.from_address,
            to: record.to_address,
            status: record.status.to_string(),
            recording_url: record.recording_url,
            recording_status: record.recording_status,
            steps: record
                .steps
                .into_iter()
                .map(|step| StepResponse {
                    name: step.name,
                    text: step.text,
                })
                .collect(),
            transcript: record.transcript,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Extracted contact details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetailsResponse {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

/// Structured summary of one call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PolishedCallResponse {
    pub details: String,
    pub customerdetails: CustomerDetailsResponse,
}

impl PolishedCallResponse {
    pub fn from_domain(summary: EnquirySummary) -> Self {
        let customer = summary.customerdetails;
        Self {
            details: summary.details,
            customerdetails: CustomerDetailsResponse {
                name: customer.name,
                phone: customer.phone,
                address: customer.address,
                email: customer.email,
            },
        }
    }
}

/// Error body used by the debug and fallback routes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
