//! In-memory implementation of BusinessDirectory

use async_trait::async_trait;

use tradeline::{BusinessDirectory, BusinessProfile, DomainError};

/// Fixed list of businesses, seeded from configuration
pub struct InMemoryBusinessDirectory {
    businesses: Vec<BusinessProfile>,
}

impl InMemoryBusinessDirectory {
    pub fn new(businesses: Vec<BusinessProfile>) -> Self {
        Self { businesses }
    }
}

#[async_trait]
impl BusinessDirectory for InMemoryBusinessDirectory {
    async fn find_by_number(&self, number: &str) -> Result<Option<BusinessProfile>, DomainError> {
        Ok(self
            .businesses
            .iter()
            .find(|business| business.answers(number))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_by_number() {
        let directory = InMemoryBusinessDirectory::new(vec![BusinessProfile::new(
            "TRADIE_101",
            "Tom's Plumbing",
            "+61400555666",
            "+61499888777",
        )]);

        let found = directory.find_by_number("+61400555666").await.unwrap();
        assert_eq!(found.map(|b| b.id), Some("TRADIE_101".to_string()));
        assert!(directory.find_by_number("+61400000000").await.unwrap().is_none());
    }
}
