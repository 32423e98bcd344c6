//! Conversation Agent Port
//!
//! The virtual assistant as an opaque turn-taking capability. How it
//! reasons is its own business; the driver only relays caller input and
//! speaks back whatever it answers.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, AgentInput, AgentTurn};

/// What the agent knows about the call it is talking on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub session_id: String,
    pub from: String,
    pub to: String,
    /// None when the dialled number belongs to no known business
    pub business_name: Option<String>,
}

impl CallContext {
    pub fn new(session_id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            from: from.into(),
            to: to.into(),
            business_name: None,
        }
    }

    pub fn with_business(mut self, name: impl Into<String>) -> Self {
        self.business_name = Some(name.into());
        self
    }
}

#[async_trait]
pub trait ConversationAgent: Send + Sync {
    /// Produce the agent's next turn for this session
    ///
    /// When `AgentTurn::enquiry_submitted` is set the turn carries the
    /// collected enquiry; the caller persists and publishes it.
    async fn next_turn(
        &self,
        call: &CallContext,
        input: AgentInput,
    ) -> Result<AgentTurn, DomainError>;
}
