//! Budget allocation.
//!
//! Turns the figures the controller entered (annual, quarterly, or
//! monthly) into the canonical 12-month array plus a recomputed annual
//! total. The rounding remainder of every allocation unit lands in its
//! last sub-period, so displayed totals never drift from the entered
//! aggregates.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::types::{BudgetAllocation, BudgetInput, BudgetMonths};

/// Normalizes an entered budget into total + canonical months.
#[must_use]
pub fn allocate(input: BudgetInput) -> BudgetAllocation {
    match input {
        BudgetInput::Annual(annual) => BudgetAllocation {
            budget_total: annual,
            budget_months: distribute_evenly(annual),
        },
        BudgetInput::Quarterly(quarters) => BudgetAllocation {
            budget_total: quarters.iter().copied().sum(),
            budget_months: distribute_quarters(&quarters),
        },
        BudgetInput::Monthly(months) => {
            let budget_months = BudgetMonths::new(months);
            BudgetAllocation {
                budget_total: budget_months.total(),
                budget_months,
            }
        }
    }
}

/// Spreads an annual total across twelve months.
///
/// Months 0-10 get the rounded per-month share; December takes
/// `total - 11 * per_month` so the sum equals the input exactly.
#[must_use]
pub fn distribute_evenly(total: Decimal) -> BudgetMonths {
    let per_month = round_whole(total / Decimal::from(12));
    let mut months = [per_month; 12];
    months[11] = total - per_month * Decimal::from(11);
    BudgetMonths::new(months)
}

/// Spreads each quarterly figure across its three months; the third month
/// of the quarter absorbs the rounding remainder.
fn distribute_quarters(quarters: &[Decimal; 4]) -> BudgetMonths {
    let mut months = [Decimal::ZERO; 12];
    for (quarter, total) in quarters.iter().enumerate() {
        let per_month = round_whole(*total / Decimal::from(3));
        let base = quarter * 3;
        months[base] = per_month;
        months[base + 1] = per_month;
        months[base + 2] = *total - per_month * Decimal::TWO;
    }
    BudgetMonths::new(months)
}

/// Rounds to a whole amount, midpoints away from zero.
fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
