//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! stores, the assistant and the enquiry publisher.

mod call_service;
mod conversation_driver;

pub use call_service::CallService;
pub use conversation_driver::{error_reply, ConversationDriver, DriverSettings};
