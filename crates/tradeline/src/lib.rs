//! Tradeline Domain Library
//!
//! Core domain types and interfaces for the Tradeline call intake service.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (CallRecord, BusinessProfile, Enquiry)
//!   - `value_objects/`: Immutable value types (CallStatus, StepName, VoiceReply)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!   - `services/`: External service interfaces (agent, publisher, LLM)
//!
//! # Usage
//!
//! ```rust,ignore
//! use tradeline::domain::{CallRecord, RecordUpdate, StepName};
//! use tradeline::ports::{CallRecordStore, EnquiryPublisher};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    AgentInput, AgentTurn, BusinessProfile, CallRecord, CallStatus, CallerInput,
    CollectedEnquiry, ConversationStep, CustomerDetails, DomainError, EnquiryPayload, EnquirySummary, FieldOp,
    GatherInput, RecordUpdate, StepName, VoiceReply, VoiceVerb, CALLER_TURN_STEP,
    VOICEMAIL_STEP,
};
pub use ports::{
    // Repositories
    AgentSessionStore,
    BusinessDirectory,
    CallRecordStore,
    // Services
    CallContext,
    ChatMessage,
    CompletionOptions,
    CompletionResponse,
    ConversationAgent,
    EnquiryPublisher,
    LlmProvider,
    MessageRole,
    ResponseFormat,
    TokenUsage,
    TranscriptExtractor,
};
