//! Service Ports
//!
//! Abstract interfaces for external services.

mod conversation_agent;
mod enquiry_publisher;
mod llm_provider;
mod transcript_extractor;

pub use conversation_agent::*;
pub use enquiry_publisher::*;
pub use llm_provider::*;
pub use transcript_extractor::*;
