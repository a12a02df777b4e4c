//! Application lifecycle.
//!
//! The explicit replacements for what the source application did with a
//! re-entrant global bootstrap function and dangling promises:
//!
//! - [`context`] - the application context and its bootstrap state machine
//! - [`poll`] - the background reload-and-reconcile tick
//! - [`activity`] - the best-effort audit side channel

pub mod activity;
pub mod context;
pub mod poll;

pub use activity::{ActivityEvent, ActivityHandle};
pub use context::{AppContext, AppPhase};
pub use poll::spawn_poll;
