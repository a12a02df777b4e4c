//! Year-to-date budget targets and deviation.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::BudgetMonths;

/// How the YTD budget target treats the current, partial month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationMode {
    /// Only fully elapsed months count.
    MonthEnd,
    /// Fully elapsed months plus a linear share of the current month.
    ProRatedToday,
}

impl DeviationMode {
    /// Parses a mode from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "month_end" => Some(Self::MonthEnd),
            "pro_rated_today" => Some(Self::ProRatedToday),
            _ => None,
        }
    }

    /// Returns the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MonthEnd => "month_end",
            Self::ProRatedToday => "pro_rated_today",
        }
    }
}

/// Result deviation against a YTD budget target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deviation {
    /// `result_ytd - budget_ytd`.
    pub deviation: Decimal,
    /// Deviation normalized against the target, in percent (2 dp).
    /// Zero when the target is zero - never infinite.
    pub deviation_percent: Decimal,
}

/// Computes the YTD budget target at `on` under the given mode.
#[must_use]
pub fn budget_ytd(months: &BudgetMonths, on: NaiveDate, mode: DeviationMode) -> Decimal {
    let month_index = on.month0() as usize;
    let elapsed: Decimal = months.as_slice()[..month_index].iter().copied().sum();

    match mode {
        DeviationMode::MonthEnd => elapsed,
        DeviationMode::ProRatedToday => {
            let day = Decimal::from(on.day());
            let days = Decimal::from(days_in_month(on.year(), on.month()));
            elapsed + months.month(month_index) * day / days
        }
    }
}

/// Computes absolute and percentage deviation of an actual YTD result.
#[must_use]
pub fn deviation(result_ytd: Decimal, budget_ytd: Decimal) -> Deviation {
    let deviation = result_ytd - budget_ytd;
    let deviation_percent = if budget_ytd.is_zero() {
        Decimal::ZERO
    } else {
        (deviation / budget_ytd * Decimal::ONE_HUNDRED).round_dp(2)
    };

    Deviation {
        deviation,
        deviation_percent,
    }
}

const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}
