//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod call_status;
mod caller_input;
mod step_name;
mod voice_reply;

pub use call_status::*;
pub use caller_input::*;
pub use step_name::*;
pub use voice_reply::*;
