//! Forecast data types.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use konsern_shared::types::{CompanyId, ForecastId};
use konsern_store::Row;

use crate::decode;

/// Expected cash movement for one company in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forecast {
    /// Row id.
    pub id: ForecastId,
    /// Company this forecast belongs to.
    pub company_id: CompanyId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Expected incoming cash (receivables collected).
    pub expected_in: Decimal,
    /// Expected outgoing cash (payables settled).
    pub expected_out: Decimal,
    /// Free-text note.
    pub note: String,
}

impl Forecast {
    /// Reconciles a persisted forecast row.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: ForecastId::new(decode::i64_field(row, "id")),
            company_id: CompanyId::new(decode::i64_field(row, "company_id")),
            year: i32::try_from(decode::i64_field(row, "year")).unwrap_or(0),
            month: u32::try_from(decode::i64_field(row, "month")).unwrap_or(0),
            expected_in: decode::decimal_field(row, "expected_in"),
            expected_out: decode::decimal_field(row, "expected_out"),
            note: decode::string_field(row, "note"),
        }
    }
}

/// Input for writing a forecast, keyed by `(company, year, month)`.
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Expected incoming cash.
    pub expected_in: Decimal,
    /// Expected outgoing cash.
    pub expected_out: Decimal,
    /// Free-text note.
    pub note: String,
}

impl ForecastEntry {
    /// Builds the snake_case row fields.
    #[must_use]
    pub fn into_row(self, company_id: CompanyId) -> Row {
        let mut row = Row::new();
        row.insert("company_id".into(), Value::from(company_id.into_inner()));
        row.insert("year".into(), Value::from(i64::from(self.year)));
        row.insert("month".into(), Value::from(i64::from(self.month)));
        row.insert(
            "expected_in".into(),
            serde_json::to_value(self.expected_in).unwrap_or(Value::Null),
        );
        row.insert(
            "expected_out".into(),
            serde_json::to_value(self.expected_out).unwrap_or(Value::Null),
        );
        row.insert("note".into(), Value::String(self.note));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_from_row_with_aliases() {
        let row: Row = [
            ("id".to_string(), json!(1)),
            ("companyId".to_string(), json!(7)),
            ("year".to_string(), json!(2026)),
            ("month".to_string(), json!(9)),
            ("expectedIn".to_string(), json!("15000")),
            ("expectedOut".to_string(), json!(9000)),
        ]
        .into_iter()
        .collect();
        let forecast = Forecast::from_row(&row);

        assert_eq!(forecast.company_id, CompanyId::new(7));
        assert_eq!(forecast.year, 2026);
        assert_eq!(forecast.month, 9);
        assert_eq!(forecast.expected_in, dec!(15000));
        assert_eq!(forecast.expected_out, dec!(9000));
        assert_eq!(forecast.note, "");
    }
}
