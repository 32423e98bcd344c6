//! In-memory implementation of AgentSessionStore

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tradeline::{AgentSessionStore, ChatMessage, DomainError};

#[derive(Default)]
pub struct InMemoryAgentSessionStore {
    sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryAgentSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentSessionStore for InMemoryAgentSessionStore {
    async fn load(&self, session_id: &str) -> Result<Vec<ChatMessage>, DomainError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), messages.to_vec());
        Ok(())
    }
}
