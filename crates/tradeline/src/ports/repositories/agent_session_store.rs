//! Agent Session Store Port
//!
//! Chat history for the virtual assistant, kept outside the process so
//! every webhook invocation can resume the conversation.

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::ports::services::ChatMessage;

#[async_trait]
pub trait AgentSessionStore: Send + Sync {
    /// History for a session, empty when the session is new
    async fn load(&self, session_id: &str) -> Result<Vec<ChatMessage>, DomainError>;

    /// Replace the stored history for a session
    async fn save(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), DomainError>;
}
