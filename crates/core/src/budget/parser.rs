//! Budget month parsing.
//!
//! Stored monthly budgets arrive in several shapes: a native JSON array, a
//! keyed object, a JSON-encoded string, a brace-delimited storage-engine
//! array literal, or nothing but an annual total. All of them normalize to
//! the canonical 12-month array here. This function never errors - a shape
//! that cannot be read becomes a zero array, and a zero array with a known
//! annual total becomes an even distribution.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::decode;

use super::allocation;
use super::types::BudgetMonths;

/// Normalizes an arbitrary stored budget representation.
///
/// Priority order: native 12-element sequence, keyed object (values in
/// enumeration order), string (JSON first, comma-split second). When
/// nothing usable is stored and `annual_total_fallback` is positive, the
/// total is distributed evenly with December absorbing the rounding
/// remainder.
#[must_use]
pub fn parse_budget_months(raw: &Value, annual_total_fallback: Decimal) -> BudgetMonths {
    let months = parse_raw(raw).unwrap_or_default();

    if months.is_zero() && annual_total_fallback > Decimal::ZERO {
        return allocation::distribute_evenly(annual_total_fallback);
    }
    months
}

fn parse_raw(raw: &Value) -> Option<BudgetMonths> {
    match raw {
        Value::Array(items) => coerce_sequence(items.iter()),
        Value::Object(map) => coerce_sequence(map.values()),
        Value::String(s) => parse_string(s),
        _ => None,
    }
}

/// Coerces an iterator of values into exactly twelve finite numbers.
fn coerce_sequence<'a>(items: impl Iterator<Item = &'a Value>) -> Option<BudgetMonths> {
    let coerced: Option<Vec<Decimal>> = items.map(decode::coerce_decimal).collect();
    to_months(coerced?)
}

fn to_months(values: Vec<Decimal>) -> Option<BudgetMonths> {
    let months: [Decimal; 12] = values.try_into().ok()?;
    Some(BudgetMonths::new(months))
}

fn parse_string(s: &str) -> Option<BudgetMonths> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Storage-engine array literals come back brace-delimited.
    let candidate = if trimmed.starts_with('{') && trimmed.ends_with('}') {
        format!("[{}]", &trimmed[1..trimmed.len() - 1])
    } else {
        trimmed.to_string()
    };

    match serde_json::from_str::<Value>(&candidate) {
        Ok(Value::Array(items)) => coerce_sequence(items.iter()),
        Ok(Value::Object(map)) => coerce_sequence(map.values()),
        Ok(_) => None,
        Err(_) => split_numeric_list(&candidate),
    }
}

/// Last resort: strip bracket characters and split on comma, accepting the
/// split only if every token is numeric.
fn split_numeric_list(s: &str) -> Option<BudgetMonths> {
    let stripped: String = s
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}'))
        .collect();

    let tokens: Option<Vec<Decimal>> = stripped
        .split(',')
        .map(|token| token.trim().parse().ok())
        .collect();
    to_months(tokens?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn twelve(value: Decimal) -> BudgetMonths {
        BudgetMonths::new([value; 12])
    }

    #[test]
    fn test_identity_on_canonical_array() {
        let raw = json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let months = parse_budget_months(&raw, Decimal::ZERO);
        assert_eq!(months.month(0), dec!(1));
        assert_eq!(months.month(11), dec!(12));
        assert_eq!(months.total(), dec!(78));
    }

    #[test]
    fn test_array_with_numeric_strings() {
        let raw = json!(["10", "10", "10", "10", "10", "10", "10", "10", "10", "10", "10", "10"]);
        assert_eq!(parse_budget_months(&raw, Decimal::ZERO), twelve(dec!(10)));
    }

    #[test]
    fn test_keyed_object_values_in_order() {
        let raw = json!({
            "jan": 1, "feb": 2, "mar": 3, "apr": 4, "may": 5, "jun": 6,
            "jul": 7, "aug": 8, "sep": 9, "oct": 10, "nov": 11, "dec": 12
        });
        let months = parse_budget_months(&raw, Decimal::ZERO);
        assert_eq!(months.month(0), dec!(1));
        assert_eq!(months.month(11), dec!(12));
    }

    #[test]
    fn test_json_encoded_string() {
        let raw = json!("[5,5,5,5,5,5,5,5,5,5,5,5]");
        assert_eq!(parse_budget_months(&raw, Decimal::ZERO), twelve(dec!(5)));
    }

    #[test]
    fn test_brace_delimited_storage_literal() {
        let raw = json!("{5,5,5,5,5,5,5,5,5,5,5,5}");
        assert_eq!(parse_budget_months(&raw, Decimal::ZERO), twelve(dec!(5)));
    }

    #[test]
    fn test_bare_comma_list_with_whitespace() {
        let raw = json!("1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12");
        let months = parse_budget_months(&raw, Decimal::ZERO);
        assert_eq!(months.total(), dec!(78));
    }

    #[test]
    fn test_wrong_length_array_falls_back_to_zero() {
        let raw = json!([1, 2, 3]);
        assert_eq!(parse_budget_months(&raw, Decimal::ZERO), BudgetMonths::zero());
    }

    #[test]
    fn test_non_numeric_element_fails_the_whole_parse() {
        let raw = json!([1, 2, 3, 4, 5, "abc", 7, 8, 9, 10, 11, 12]);
        assert_eq!(parse_budget_months(&raw, Decimal::ZERO), BudgetMonths::zero());
    }

    #[test]
    fn test_non_numeric_token_rejects_comma_split() {
        let raw = json!("1,2,3,4,5,six,7,8,9,10,11,12");
        assert_eq!(parse_budget_months(&raw, Decimal::ZERO), BudgetMonths::zero());
    }

    #[test]
    fn test_garbage_falls_back_to_even_distribution() {
        let months = parse_budget_months(&json!("not a budget"), dec!(120000));
        assert_eq!(months, twelve(dec!(10000)));
        assert_eq!(months.total(), dec!(120000));
    }

    #[test]
    fn test_zero_array_with_fallback_distributes() {
        let raw = json!([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let months = parse_budget_months(&raw, dec!(100000));
        // 100000/12 rounds to 8333; December absorbs the remainder.
        assert_eq!(months.month(0), dec!(8333));
        assert_eq!(months.month(11), dec!(100000) - dec!(8333) * dec!(11));
        assert_eq!(months.total(), dec!(100000));
    }

    #[test]
    fn test_zero_fallback_keeps_zero_array() {
        let months = parse_budget_months(&json!(null), Decimal::ZERO);
        assert_eq!(months, BudgetMonths::zero());
    }

    #[test]
    fn test_nonzero_months_ignore_fallback() {
        let raw = json!([1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let months = parse_budget_months(&raw, dec!(120000));
        assert_eq!(months.month(0), dec!(1));
        assert_eq!(months.total(), dec!(1));
    }
}
