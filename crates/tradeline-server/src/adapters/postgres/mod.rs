//! PostgreSQL Repository Implementations

mod agent_sessions;
mod business_directory;
mod call_store;

pub use agent_sessions::PgAgentSessionStore;
pub use business_directory::PgBusinessDirectory;
pub use call_store::PgCallStore;
