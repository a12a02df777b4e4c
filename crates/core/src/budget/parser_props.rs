//! Property-based tests for budget parsing, allocation, and YTD.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::types::{BudgetInput, BudgetMonths};
use super::ytd::DeviationMode;
use super::{allocate, budget_ytd, parse_budget_months};

/// Whole non-negative amounts, the range controllers actually enter.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(Decimal::from)
}

fn arb_months() -> impl Strategy<Value = [Decimal; 12]> {
    proptest::array::uniform12(arb_amount())
}

fn arb_garbage() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!(true)),
        Just(json!({"a": "b"})),
        any::<String>().prop_map(Value::String),
        proptest::collection::vec(any::<i32>().prop_map(Value::from), 0..11)
            .prop_map(Value::Array),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Already-canonical arrays parse to themselves.
    #[test]
    fn prop_parser_identity_on_canonical(months in arb_months(), fallback in arb_amount()) {
        let raw = serde_json::to_value(BudgetMonths::new(months)).expect("serializes");
        let parsed = parse_budget_months(&raw, fallback);
        if !BudgetMonths::new(months).is_zero() {
            prop_assert_eq!(parsed, BudgetMonths::new(months));
        }
    }

    /// Whatever the input, the output is a well-formed 12-array.
    #[test]
    fn prop_parser_total_on_garbage(raw in arb_garbage(), fallback in arb_amount()) {
        let parsed = parse_budget_months(&raw, fallback);
        prop_assert_eq!(parsed.as_slice().len(), 12);
        for month in parsed.as_slice() {
            prop_assert!(*month >= Decimal::ZERO);
        }
    }

    /// Fallback distribution sums exactly to the annual total.
    #[test]
    fn prop_fallback_sum_is_exact(fallback in arb_amount()) {
        let parsed = parse_budget_months(&Value::Null, fallback);
        prop_assert_eq!(parsed.total(), fallback);
    }

    /// Annual allocation never drifts from the entered total.
    #[test]
    fn prop_annual_allocation_sum_exact(annual in arb_amount()) {
        let allocated = allocate(BudgetInput::Annual(annual));
        prop_assert_eq!(allocated.budget_total, annual);
        prop_assert_eq!(allocated.budget_months.total(), annual);
    }

    /// Each quarter's three months sum exactly to the entered quarter.
    #[test]
    fn prop_quarterly_allocation_sum_exact(quarters in proptest::array::uniform4(arb_amount())) {
        let allocated = allocate(BudgetInput::Quarterly(quarters));
        for (quarter, total) in quarters.iter().enumerate() {
            let base = quarter * 3;
            let sum = allocated.budget_months.month(base)
                + allocated.budget_months.month(base + 1)
                + allocated.budget_months.month(base + 2);
            prop_assert_eq!(sum, *total, "quarter {}", quarter);
        }
        prop_assert_eq!(allocated.budget_total, quarters.iter().copied().sum::<Decimal>());
    }

    /// The YTD target is bounded by the full-year total, in both modes.
    #[test]
    fn prop_ytd_bounded_by_annual_total(
        months in arb_months(),
        month in 1u32..=12,
        day in 1u32..=28,
        pro_rated in proptest::bool::ANY,
    ) {
        let months = BudgetMonths::new(months);
        let on = NaiveDate::from_ymd_opt(2026, month, day).expect("valid date");
        let mode = if pro_rated { DeviationMode::ProRatedToday } else { DeviationMode::MonthEnd };
        let ytd = budget_ytd(&months, on, mode);
        prop_assert!(ytd >= Decimal::ZERO);
        prop_assert!(ytd <= months.total());
    }

    /// Pro-rated is never below month-end for the same date.
    #[test]
    fn prop_pro_rated_at_least_month_end(
        months in arb_months(),
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let months = BudgetMonths::new(months);
        let on = NaiveDate::from_ymd_opt(2026, month, day).expect("valid date");
        let month_end = budget_ytd(&months, on, DeviationMode::MonthEnd);
        let pro_rated = budget_ytd(&months, on, DeviationMode::ProRatedToday);
        prop_assert!(pro_rated >= month_end);
    }
}
