//! In-process implementations, for single-instance runs and tests

mod agent_sessions;
mod business_directory;
mod call_store;

pub use agent_sessions::InMemoryAgentSessionStore;
pub use business_directory::InMemoryBusinessDirectory;
pub use call_store::InMemoryCallStore;
