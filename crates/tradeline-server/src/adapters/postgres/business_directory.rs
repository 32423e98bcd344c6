//! PostgreSQL implementation of BusinessDirectory

use async_trait::async_trait;
use sqlx::PgPool;

use tradeline::domain::normalize_number;
use tradeline::{BusinessDirectory, BusinessProfile, DomainError};

pub struct PgBusinessDirectory {
    pool: PgPool,
}

impl PgBusinessDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the profile unless its virtual number is already taken.
    /// Numbers are stored normalized so `find_by_number` can match them.
    pub async fn seed(&self, business: &BusinessProfile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO businesses (id, name, virtual_number, forward_number)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(normalize_number(&business.virtual_number))
        .bind(&business.forward_number)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct BusinessRow {
    id: String,
    name: String,
    virtual_number: String,
    forward_number: String,
}

impl From<BusinessRow> for BusinessProfile {
    fn from(row: BusinessRow) -> Self {
        BusinessProfile::new(row.id, row.name, row.virtual_number, row.forward_number)
    }
}

#[async_trait]
impl BusinessDirectory for PgBusinessDirectory {
    async fn find_by_number(&self, number: &str) -> Result<Option<BusinessProfile>, DomainError> {
        let row = sqlx::query_as::<_, BusinessRow>(
            "SELECT id, name, virtual_number, forward_number FROM businesses WHERE virtual_number = $1",
        )
        .bind(normalize_number(number))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }
}
