//! Business Directory Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, BusinessProfile};

/// Read-only lookup of the business owning a dialled number
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    /// Find the business whose virtual number is `number`
    async fn find_by_number(&self, number: &str) -> Result<Option<BusinessProfile>, DomainError>;
}
