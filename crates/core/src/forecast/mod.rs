//! Per-company, per-month cash-flow forecasts.
//!
//! Forecasts estimate expected receivable/payable movement for future
//! months and feed the liquidity projection of the risk view. They share
//! the reconciliation pattern: lenient row decode, fully-defaulted types.

pub mod service;
pub mod types;

pub use service::{ForecastService, project_liquidity};
pub use types::{Forecast, ForecastEntry};
