//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod gemini;
pub mod memory;
pub mod postgres;
pub mod publisher;

// Re-exports
pub use gemini::GeminiProvider;
pub use memory::{InMemoryAgentSessionStore, InMemoryBusinessDirectory, InMemoryCallStore};
pub use postgres::{PgAgentSessionStore, PgBusinessDirectory, PgCallStore};
pub use publisher::HttpEnquiryPublisher;
