//! Raw-row reconciliation into canonical company records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use konsern_shared::types::{CompanyId, GroupId};
use konsern_store::Row;

use crate::budget::{self, BudgetMode, DeviationMode, parse_budget_months};
use crate::decode;

use super::types::{Company, ComputedCompany};

/// Maps one raw persisted record onto the canonical company entity.
///
/// Either key spelling is accepted for every field; missing numerics
/// become zero, missing strings become "". The budget is normalized via
/// the parser with `budget_total` as the even-distribution fallback, and
/// the total is regenerated from the months when the two disagree.
#[must_use]
pub fn reconcile(row: &Row) -> Company {
    let stored_total = decode::decimal_field(row, "budget_total");
    let raw_months = decode::field(row, "budget_months")
        .cloned()
        .unwrap_or(Value::Null);
    let budget_months = parse_budget_months(&raw_months, stored_total);
    let budget_total = if budget_months.is_zero() {
        stored_total
    } else {
        budget_months.total()
    };

    Company {
        id: CompanyId::new(decode::i64_field(row, "id")),
        group_id: GroupId::new(decode::i64_field(row, "group_id")),
        name: decode::string_field(row, "name"),
        full_name: decode::string_field(row, "full_name"),
        manager: decode::string_field(row, "manager"),
        revenue: decode::decimal_field(row, "revenue"),
        revenue_date: decode::string_field(row, "revenue_date"),
        expenses: decode::decimal_field(row, "expenses"),
        expenses_date: decode::string_field(row, "expenses_date"),
        result_ytd: decode::decimal_field(row, "result_ytd"),
        liquidity: decode::decimal_field(row, "liquidity"),
        liquidity_date: decode::string_field(row, "liquidity_date"),
        receivables: decode::decimal_field(row, "receivables"),
        receivables_date: decode::string_field(row, "receivables_date"),
        accounts_payable: decode::decimal_field(row, "accounts_payable"),
        accounts_payable_date: decode::string_field(row, "accounts_payable_date"),
        public_fees: decode::decimal_field(row, "public_fees"),
        public_fees_date: decode::string_field(row, "public_fees_date"),
        salary_expenses: decode::decimal_field(row, "salary_expenses"),
        salary_expenses_date: decode::string_field(row, "salary_expenses_date"),
        budget_total,
        budget_mode: decode::field(row, "budget_mode")
            .and_then(Value::as_str)
            .and_then(BudgetMode::parse)
            .unwrap_or(BudgetMode::Annual),
        budget_months,
        sort_order: decode::i64_field(row, "sort_order"),
        trend_history: trend_history(row),
        prev_liquidity: decode::decimal_field(row, "prev_liquidity"),
        prev_deviation: decode::decimal_field(row, "prev_deviation"),
        last_report_date: decode::string_field(row, "last_report_date"),
        last_report_by: decode::string_field(row, "last_report_by"),
        comment: decode::string_field(row, "comment"),
    }
}

/// Reconciles a full result set, sorted ascending by display position.
///
/// The sort is stable: rows sharing a `sort_order` keep their original
/// relative order.
#[must_use]
pub fn reconcile_all(rows: &[Row]) -> Vec<Company> {
    let mut companies: Vec<Company> = rows.iter().map(reconcile).collect();
    companies.sort_by_key(|company| company.sort_order);
    companies
}

/// Derives the display deviation figures for one company.
#[must_use]
pub fn computed(company: Company, on: NaiveDate, mode: DeviationMode) -> ComputedCompany {
    let calculated_budget_ytd = budget::budget_ytd(&company.budget_months, on, mode);
    let deviation = budget::deviation(company.result_ytd, calculated_budget_ytd);
    ComputedCompany {
        company,
        calculated_budget_ytd,
        calculated_deviation_percent: deviation.deviation_percent,
    }
}

/// Historic trend samples: an array, or a string-encoded list, or nothing.
fn trend_history(row: &Row) -> Vec<Decimal> {
    match decode::field(row, "trend_history") {
        Some(Value::Array(items)) => items.iter().map(decode::lenient_decimal).collect(),
        Some(Value::String(s)) => s
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '{' | '}'))
            .collect::<String>()
            .split(',')
            .filter(|token| !token.trim().is_empty())
            .map(|token| token.trim().parse().unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}
