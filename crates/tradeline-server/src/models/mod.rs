//! Tradeline Server Models
//!
//! - Callback: inbound provider webhook payloads
//! - TwiML: rendering voice replies as provider markup
//! - Call: debug view DTOs

mod call;
mod callback;
mod twiml;

pub use call::*;
pub use callback::*;
pub use twiml::*;
