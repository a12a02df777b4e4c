//! Budget normalization, allocation, and YTD deviation.
//!
//! Whatever shape a monthly budget was stored in, it enters the rest of
//! the system as a canonical January-first 12-month array. Deviation is
//! always computed against that array, under one of two display modes.

pub mod allocation;
pub mod parser;
pub mod types;
pub mod ytd;

#[cfg(test)]
mod parser_props;

pub use allocation::allocate;
pub use parser::parse_budget_months;
pub use types::{BudgetAllocation, BudgetInput, BudgetMode, BudgetMonths};
pub use ytd::{Deviation, DeviationMode, budget_ytd, deviation};
