//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod agent_session_store;
mod business_directory;
mod call_record_store;

pub use agent_session_store::*;
pub use business_directory::*;
pub use call_record_store::*;
