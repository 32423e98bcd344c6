//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - CallRecord: one phone call and its captured steps
//! - BusinessProfile: the business a virtual number belongs to
//! - Enquiry: outbound payload and extracted summary

mod business;
mod call_record;
mod enquiry;

pub use business::*;
pub use call_record::*;
pub use enquiry::*;
