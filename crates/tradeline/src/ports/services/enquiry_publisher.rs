//! Enquiry Publisher Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, EnquiryPayload};

/// Emits a finished enquiry to the downstream system
///
/// One attempt per call, no retries. Callers treat failure as
/// log-and-continue.
#[async_trait]
pub trait EnquiryPublisher: Send + Sync {
    async fn publish(&self, payload: &EnquiryPayload) -> Result<(), DomainError>;
}
