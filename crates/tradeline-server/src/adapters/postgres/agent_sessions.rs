//! PostgreSQL implementation of AgentSessionStore

use async_trait::async_trait;
use sqlx::PgPool;

use tradeline::{AgentSessionStore, ChatMessage, DomainError};

pub struct PgAgentSessionStore {
    pool: PgPool,
}

impl PgAgentSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentSessionStore for PgAgentSessionStore {
    async fn load(&self, session_id: &str) -> Result<Vec<ChatMessage>, DomainError> {
        let messages = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT messages FROM agent_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        match messages {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| DomainError::Repository(format!("Corrupt agent session: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), DomainError> {
        let messages_json =
            serde_json::to_value(messages).map_err(|e| DomainError::Repository(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO agent_sessions (session_id, messages)
            VALUES ($1, $2)
            ON CONFLICT (session_id) DO UPDATE SET messages = EXCLUDED.messages, updated_at = NOW()
            "#,
        )
        .bind(session_id)
        .bind(&messages_json)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}
