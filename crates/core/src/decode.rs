//! Lenient field coercion and the field-alias table.
//!
//! The remote rowstore returns two cased variants for the same logical
//! field, interchangeably. Instead of dual-key lookups scattered through
//! the codebase, every read goes through [`field`], which consults a single
//! alias table. Writes always emit the snake_case spelling.
//!
//! Coercion mirrors the dashboard's survival rule: malformed data is never
//! fatal. [`lenient_decimal`] resolves anything unusable to zero so the
//! canonical model can be formatted unconditionally.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;

use konsern_store::Row;

/// snake_case field name -> camelCase spelling seen in legacy rows.
static FIELD_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("group_id", "groupId"),
        ("full_name", "fullName"),
        ("result_ytd", "resultYTD"),
        ("accounts_payable", "accountsPayable"),
        ("public_fees", "publicFees"),
        ("salary_expenses", "salaryExpenses"),
        ("budget_total", "budgetTotal"),
        ("budget_mode", "budgetMode"),
        ("budget_months", "budgetMonths"),
        ("sort_order", "sortOrder"),
        ("trend_history", "trendHistory"),
        ("prev_liquidity", "prevLiquidity"),
        ("prev_deviation", "prevDeviation"),
        ("last_report_date", "lastReportDate"),
        ("last_report_by", "lastReportBy"),
        ("company_id", "companyId"),
        ("author_name", "authorName"),
        ("approved_by", "approvedBy"),
        ("approved_at", "approvedAt"),
        ("revenue_date", "revenueDate"),
        ("expenses_date", "expensesDate"),
        ("liquidity_date", "liquidityDate"),
        ("receivables_date", "receivablesDate"),
        ("accounts_payable_date", "accountsPayableDate"),
        ("public_fees_date", "publicFeesDate"),
        ("salary_expenses_date", "salaryExpensesDate"),
        ("expected_in", "expectedIn"),
        ("expected_out", "expectedOut"),
        ("user_id", "userId"),
    ])
});

/// Looks up `name` in the row, falling back to its aliased spelling.
///
/// `Value::Null` counts as absent: the legacy store writes explicit nulls
/// for cleared fields.
#[must_use]
pub fn field<'a>(row: &'a Row, name: &str) -> Option<&'a Value> {
    let direct = row.get(name).filter(|value| !value.is_null());
    direct.or_else(|| {
        FIELD_ALIASES
            .get(name)
            .and_then(|alias| row.get(*alias))
            .filter(|value| !value.is_null())
    })
}

/// Strict-ish numeric coercion: `None` means "not a finite number".
///
/// Numbers and numeric strings coerce; null, empty strings, and booleans
/// follow the legacy engine's loose rules; anything else fails.
#[must_use]
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(Decimal::ZERO)
            } else {
                trimmed.parse().ok()
            }
        }
        Value::Null => Some(Decimal::ZERO),
        Value::Bool(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        _ => None,
    }
}

/// `Number(...) || 0` of the original: unusable values become zero.
#[must_use]
pub fn lenient_decimal(value: &Value) -> Decimal {
    coerce_decimal(value).unwrap_or_default()
}

/// Reads a numeric field through the alias table, defaulting to zero.
#[must_use]
pub fn decimal_field(row: &Row, name: &str) -> Decimal {
    field(row, name).map(lenient_decimal).unwrap_or_default()
}

/// Reads a numeric field that is allowed to be absent.
///
/// Absent (or null) stays `None` - a report row without `revenue` must not
/// be mistaken for a report of zero revenue.
#[must_use]
pub fn opt_decimal_field(row: &Row, name: &str) -> Option<Decimal> {
    field(row, name).map(lenient_decimal)
}

/// Reads an integer field through the alias table, defaulting to zero.
#[must_use]
pub fn i64_field(row: &Row, name: &str) -> i64 {
    field(row, name)
        .map(|value| match value {
            Value::Number(n) => n.as_i64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
        .unwrap_or(0)
}

/// Reads a string field through the alias table, defaulting to "".
#[must_use]
pub fn string_field(row: &Row, name: &str) -> String {
    field(row, name)
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

/// Reads a string field that is allowed to be absent.
#[must_use]
pub fn opt_string_field(row: &Row, name: &str) -> Option<String> {
    field(row, name).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_prefers_snake_case() {
        let r = row(&[
            ("budget_total", json!(100)),
            ("budgetTotal", json!(999)),
        ]);
        assert_eq!(field(&r, "budget_total"), Some(&json!(100)));
    }

    #[test]
    fn test_field_falls_back_to_camel_case() {
        let r = row(&[("budgetTotal", json!(999))]);
        assert_eq!(field(&r, "budget_total"), Some(&json!(999)));
    }

    #[test]
    fn test_field_null_counts_as_absent() {
        let r = row(&[("budget_total", Value::Null), ("budgetTotal", json!(5))]);
        assert_eq!(field(&r, "budget_total"), Some(&json!(5)));

        let r = row(&[("revenue", Value::Null)]);
        assert_eq!(field(&r, "revenue"), None);
    }

    #[test]
    fn test_coerce_decimal() {
        assert_eq!(coerce_decimal(&json!(12.5)), Some(dec!(12.5)));
        assert_eq!(coerce_decimal(&json!("12.5")), Some(dec!(12.5)));
        assert_eq!(coerce_decimal(&json!(" 7 ")), Some(dec!(7)));
        assert_eq!(coerce_decimal(&json!("")), Some(Decimal::ZERO));
        assert_eq!(coerce_decimal(&Value::Null), Some(Decimal::ZERO));
        assert_eq!(coerce_decimal(&json!(true)), Some(Decimal::ONE));
        assert_eq!(coerce_decimal(&json!("abc")), None);
        assert_eq!(coerce_decimal(&json!({})), None);
    }

    #[test]
    fn test_lenient_decimal_defaults_to_zero() {
        assert_eq!(lenient_decimal(&json!("garbage")), Decimal::ZERO);
        assert_eq!(lenient_decimal(&json!([1, 2])), Decimal::ZERO);
    }

    #[test]
    fn test_opt_decimal_field_keeps_absence() {
        let r = row(&[("liquidity", json!(50000))]);
        assert_eq!(opt_decimal_field(&r, "liquidity"), Some(dec!(50000)));
        assert_eq!(opt_decimal_field(&r, "revenue"), None);
    }

    #[test]
    fn test_string_field_defaults_empty() {
        let r = row(&[("fullName", json!("Alpha AS"))]);
        assert_eq!(string_field(&r, "full_name"), "Alpha AS");
        assert_eq!(string_field(&r, "comment"), "");
    }

    #[test]
    fn test_i64_field() {
        let r = row(&[("sortOrder", json!("3"))]);
        assert_eq!(i64_field(&r, "sort_order"), 3);
        assert_eq!(i64_field(&r, "id"), 0);
    }
}
