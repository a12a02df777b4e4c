//! Company data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use konsern_shared::types::{CompanyId, GroupId};
use konsern_store::Row;

use crate::budget::{BudgetInput, BudgetMode, BudgetMonths, allocate};

/// A subsidiary company, fully defaulted.
///
/// Every numeric field is a concrete amount (zero when the source row had
/// nothing usable) and every string is at worst empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Row id.
    pub id: CompanyId,
    /// Owning holding-company tenant.
    pub group_id: GroupId,
    /// Short code, e.g. "ALF".
    pub name: String,
    /// Legal name, e.g. "Alpha AS".
    pub full_name: String,
    /// Comma-joined leader names; derived, see `access::sync_manager_names`.
    pub manager: String,
    /// Reported revenue, year to date.
    pub revenue: Decimal,
    /// As-of display date for revenue.
    pub revenue_date: String,
    /// Reported expenses, year to date.
    pub expenses: Decimal,
    /// As-of display date for expenses.
    pub expenses_date: String,
    /// Cached result (revenue - expenses when report-derived).
    pub result_ytd: Decimal,
    /// Bank liquidity.
    pub liquidity: Decimal,
    /// As-of display date for liquidity.
    pub liquidity_date: String,
    /// Outstanding receivables.
    pub receivables: Decimal,
    /// As-of display date for receivables.
    pub receivables_date: String,
    /// Accounts payable.
    pub accounts_payable: Decimal,
    /// As-of display date for accounts payable.
    pub accounts_payable_date: String,
    /// Public fees due (VAT, employer contributions).
    pub public_fees: Decimal,
    /// As-of display date for public fees.
    pub public_fees_date: String,
    /// Salary expenses.
    pub salary_expenses: Decimal,
    /// As-of display date for salary expenses.
    pub salary_expenses_date: String,
    /// Annual budget figure, consistent with the months.
    pub budget_total: Decimal,
    /// How the budget was last entered.
    pub budget_mode: BudgetMode,
    /// Canonical 12-month budget array.
    pub budget_months: BudgetMonths,
    /// Controller-assigned display position.
    pub sort_order: i64,
    /// Historic result samples for the trend sparkline.
    pub trend_history: Vec<Decimal>,
    /// Comparison-period liquidity, fed by an external batch process.
    pub prev_liquidity: Decimal,
    /// Comparison-period deviation percent, fed by an external batch process.
    pub prev_deviation: Decimal,
    /// Date of the most recent report.
    pub last_report_date: String,
    /// Author of the most recent report.
    pub last_report_by: String,
    /// Free-text comment from the most recent report or edit.
    pub comment: String,
}

/// A company plus the derived, never-persisted deviation figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedCompany {
    /// The canonical record.
    #[serde(flatten)]
    pub company: Company,
    /// YTD budget target under the current display mode.
    pub calculated_budget_ytd: Decimal,
    /// Signed deviation percent of `result_ytd` against the target.
    pub calculated_deviation_percent: Decimal,
}

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CompanyDraft {
    /// Short code.
    pub name: String,
    /// Legal name.
    pub full_name: String,
    /// Optional initial budget entry.
    pub budget: Option<BudgetInput>,
}

impl CompanyDraft {
    /// Builds the snake_case row to insert.
    #[must_use]
    pub fn into_row(self, group_id: GroupId, sort_order: i64) -> Row {
        let mut row = Row::new();
        row.insert("group_id".into(), Value::from(group_id.into_inner()));
        row.insert("name".into(), Value::String(self.name));
        row.insert("full_name".into(), Value::String(self.full_name));
        row.insert(
            "manager".into(),
            Value::String(crate::access::NO_MANAGER.to_string()),
        );
        row.insert("sort_order".into(), Value::from(sort_order));
        if let Some(input) = self.budget {
            write_budget(&mut row, input);
        }
        row
    }
}

/// Partial company edit; absent fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
    /// New short code.
    pub name: Option<String>,
    /// New legal name.
    pub full_name: Option<String>,
    /// New comment.
    pub comment: Option<String>,
    /// New revenue figure.
    pub revenue: Option<Decimal>,
    /// As-of date for revenue.
    pub revenue_date: Option<String>,
    /// New expenses figure.
    pub expenses: Option<Decimal>,
    /// As-of date for expenses.
    pub expenses_date: Option<String>,
    /// Manual result override.
    pub result_ytd: Option<Decimal>,
    /// New liquidity figure.
    pub liquidity: Option<Decimal>,
    /// As-of date for liquidity.
    pub liquidity_date: Option<String>,
    /// New receivables figure.
    pub receivables: Option<Decimal>,
    /// As-of date for receivables.
    pub receivables_date: Option<String>,
    /// New accounts payable figure.
    pub accounts_payable: Option<Decimal>,
    /// As-of date for accounts payable.
    pub accounts_payable_date: Option<String>,
    /// New public fees figure.
    pub public_fees: Option<Decimal>,
    /// As-of date for public fees.
    pub public_fees_date: Option<String>,
    /// New salary expenses figure.
    pub salary_expenses: Option<Decimal>,
    /// As-of date for salary expenses.
    pub salary_expenses_date: Option<String>,
    /// Re-entered budget.
    pub budget: Option<BudgetInput>,
    /// Externally-fed comparison liquidity.
    pub prev_liquidity: Option<Decimal>,
    /// Externally-fed comparison deviation.
    pub prev_deviation: Option<Decimal>,
    /// Replacement trend history.
    pub trend_history: Option<Vec<Decimal>>,
}

impl CompanyUpdate {
    /// Builds the snake_case patch row.
    ///
    /// When revenue and expenses are both present without an explicit
    /// result override, the result is re-derived as revenue - expenses.
    #[must_use]
    pub fn into_row(self) -> Row {
        let mut row = Row::new();

        let result_ytd = match (self.result_ytd, self.revenue, self.expenses) {
            (Some(explicit), _, _) => Some(explicit),
            (None, Some(revenue), Some(expenses)) => Some(revenue - expenses),
            _ => None,
        };

        insert_string(&mut row, "name", self.name);
        insert_string(&mut row, "full_name", self.full_name);
        insert_string(&mut row, "comment", self.comment);
        insert_decimal(&mut row, "revenue", self.revenue);
        insert_string(&mut row, "revenue_date", self.revenue_date);
        insert_decimal(&mut row, "expenses", self.expenses);
        insert_string(&mut row, "expenses_date", self.expenses_date);
        insert_decimal(&mut row, "result_ytd", result_ytd);
        insert_decimal(&mut row, "liquidity", self.liquidity);
        insert_string(&mut row, "liquidity_date", self.liquidity_date);
        insert_decimal(&mut row, "receivables", self.receivables);
        insert_string(&mut row, "receivables_date", self.receivables_date);
        insert_decimal(&mut row, "accounts_payable", self.accounts_payable);
        insert_string(&mut row, "accounts_payable_date", self.accounts_payable_date);
        insert_decimal(&mut row, "public_fees", self.public_fees);
        insert_string(&mut row, "public_fees_date", self.public_fees_date);
        insert_decimal(&mut row, "salary_expenses", self.salary_expenses);
        insert_string(&mut row, "salary_expenses_date", self.salary_expenses_date);
        insert_decimal(&mut row, "prev_liquidity", self.prev_liquidity);
        insert_decimal(&mut row, "prev_deviation", self.prev_deviation);

        if let Some(history) = self.trend_history {
            let values: Vec<Value> = history
                .into_iter()
                .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
                .collect();
            row.insert("trend_history".into(), Value::Array(values));
        }
        if let Some(input) = self.budget {
            write_budget(&mut row, input);
        }
        row
    }
}

fn insert_string(row: &mut Row, key: &str, value: Option<String>) {
    if let Some(value) = value {
        row.insert(key.to_string(), Value::String(value));
    }
}

fn insert_decimal(row: &mut Row, key: &str, value: Option<Decimal>) {
    if let Some(value) = value {
        row.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
    }
}

fn write_budget(row: &mut Row, input: BudgetInput) {
    let mode = input.mode();
    let allocated = allocate(input);
    row.insert(
        "budget_total".into(),
        serde_json::to_value(allocated.budget_total).unwrap_or(Value::Null),
    );
    row.insert("budget_mode".into(), Value::String(mode.as_str().to_string()));
    row.insert(
        "budget_months".into(),
        serde_json::to_value(allocated.budget_months).unwrap_or(Value::Null),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_update_derives_result_from_revenue_and_expenses() {
        let update = CompanyUpdate {
            revenue: Some(dec!(1000)),
            expenses: Some(dec!(400)),
            ..CompanyUpdate::default()
        };
        let row = update.into_row();
        assert_eq!(
            row.get("result_ytd"),
            Some(&serde_json::to_value(dec!(600)).expect("serializes"))
        );
    }

    #[test]
    fn test_update_explicit_result_wins() {
        let update = CompanyUpdate {
            revenue: Some(dec!(1000)),
            expenses: Some(dec!(400)),
            result_ytd: Some(dec!(999)),
            ..CompanyUpdate::default()
        };
        let row = update.into_row();
        assert_eq!(
            row.get("result_ytd"),
            Some(&serde_json::to_value(dec!(999)).expect("serializes"))
        );
    }

    #[test]
    fn test_update_partial_revenue_does_not_derive_result() {
        let update = CompanyUpdate {
            revenue: Some(dec!(1000)),
            ..CompanyUpdate::default()
        };
        let row = update.into_row();
        assert!(!row.contains_key("result_ytd"));
        assert!(!row.contains_key("expenses"));
    }

    #[test]
    fn test_update_budget_writes_all_three_fields() {
        let update = CompanyUpdate {
            budget: Some(BudgetInput::Annual(dec!(120000))),
            ..CompanyUpdate::default()
        };
        let row = update.into_row();
        assert_eq!(row.get("budget_mode"), Some(&Value::String("annual".into())));
        assert!(row.contains_key("budget_total"));
        assert!(row.contains_key("budget_months"));
    }

    #[test]
    fn test_draft_row_has_placeholder_manager() {
        let draft = CompanyDraft {
            name: "ALF".into(),
            full_name: "Alpha AS".into(),
            budget: None,
        };
        let row = draft.into_row(GroupId::new(1), 4);
        assert_eq!(
            row.get("manager"),
            Some(&Value::String("No manager assigned".into()))
        );
        assert_eq!(row.get("sort_order"), Some(&Value::from(4)));
    }
}
