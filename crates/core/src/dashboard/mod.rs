//! Dashboard assembly.
//!
//! Plain data structures for the presentation layer: computed company
//! rows, group totals, and risk entries comparing the current period to
//! the externally-fed previous one.

pub mod types;

pub use types::{DashboardSnapshot, GroupTotals, RiskEntry, Trend, build};
