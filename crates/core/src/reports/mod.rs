//! The append-only report ledger.
//!
//! Reports are the events of a company's financial history. Submitting one
//! persists the report row and then merges its supplied fields into the
//! company's cached snapshot; approval freezes it until a controller
//! unlocks it again.

pub mod error;
pub mod ledger;
pub mod types;


pub use error::ReportError;
pub use ledger::ReportLedger;
pub use types::{Report, ReportEdit, ReportFields, ReportSource, ReportStatus, ReportSubmission};
