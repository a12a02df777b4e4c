//! Report data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use konsern_shared::types::{CompanyId, ReportId, UserId};
use konsern_store::Row;

use crate::decode;

/// Report lifecycle status.
///
/// `submitted ⇄ approved` are the live transitions; `draft` exists in the
/// schema for forward compatibility but no current flow produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Awaiting controller approval; editable.
    Submitted,
    /// Approved by a controller; read-only until unlocked.
    Approved,
    /// Dead state, never produced by current flows.
    Draft,
}

impl ReportStatus {
    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Draft => "draft",
        }
    }

    /// Returns true while the report can still be edited or deleted.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !matches!(self, Self::Approved)
    }

    /// Checks whether a status transition is allowed.
    ///
    /// Valid transitions:
    /// - Submitted → Approved (approve, controller)
    /// - Approved → Submitted (unlock, controller)
    /// - Draft → Submitted (forward compatibility)
    #[must_use]
    pub fn is_valid_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Submitted, Self::Approved)
                | (Self::Approved, Self::Submitted)
                | (Self::Draft, Self::Submitted)
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the reported figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportSource {
    /// Hand-entered figures.
    Manuell,
    /// Imported from Tripletex.
    Tripletex,
    /// Imported from PowerOffice.
    PowerOffice,
    /// Imported from Visma.
    Visma,
}

impl ReportSource {
    /// Parses a source from its stored spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Manuell" => Some(Self::Manuell),
            "Tripletex" => Some(Self::Tripletex),
            "PowerOffice" => Some(Self::PowerOffice),
            "Visma" => Some(Self::Visma),
            _ => None,
        }
    }

    /// Returns the stored spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manuell => "Manuell",
            Self::Tripletex => "Tripletex",
            Self::PowerOffice => "PowerOffice",
            Self::Visma => "Visma",
        }
    }
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The financial fields of a report. Every one is independently optional:
/// a report may update only a subset of metrics, and absent fields must
/// not overwrite the company snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    /// Revenue, year to date.
    pub revenue: Option<Decimal>,
    /// As-of date for revenue.
    pub revenue_date: Option<String>,
    /// Expenses, year to date.
    pub expenses: Option<Decimal>,
    /// As-of date for expenses.
    pub expenses_date: Option<String>,
    /// Result; derived as revenue - expenses when both are supplied.
    pub result: Option<Decimal>,
    /// Bank liquidity.
    pub liquidity: Option<Decimal>,
    /// As-of date for liquidity.
    pub liquidity_date: Option<String>,
    /// Outstanding receivables.
    pub receivables: Option<Decimal>,
    /// As-of date for receivables.
    pub receivables_date: Option<String>,
    /// Accounts payable.
    pub accounts_payable: Option<Decimal>,
    /// As-of date for accounts payable.
    pub accounts_payable_date: Option<String>,
    /// Public fees due.
    pub public_fees: Option<Decimal>,
    /// As-of date for public fees.
    pub public_fees_date: Option<String>,
    /// Salary expenses.
    pub salary_expenses: Option<Decimal>,
    /// As-of date for salary expenses.
    pub salary_expenses_date: Option<String>,
}

impl ReportFields {
    /// Derives `result` when revenue and expenses are both supplied -
    /// either may be zero, which still counts as supplied.
    #[must_use]
    pub fn with_derived_result(mut self) -> Self {
        if let (Some(revenue), Some(expenses)) = (self.revenue, self.expenses) {
            self.result = Some(revenue - expenses);
        }
        self
    }

    /// Returns true when no financial field is supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.report_row().is_empty()
    }

    /// Row fragment for the report table: only supplied fields.
    #[must_use]
    pub fn report_row(&self) -> Row {
        let mut row = Row::new();
        insert_decimal(&mut row, "revenue", self.revenue);
        insert_string(&mut row, "revenue_date", self.revenue_date.clone());
        insert_decimal(&mut row, "expenses", self.expenses);
        insert_string(&mut row, "expenses_date", self.expenses_date.clone());
        insert_decimal(&mut row, "result", self.result);
        insert_decimal(&mut row, "liquidity", self.liquidity);
        insert_string(&mut row, "liquidity_date", self.liquidity_date.clone());
        insert_decimal(&mut row, "receivables", self.receivables);
        insert_string(&mut row, "receivables_date", self.receivables_date.clone());
        insert_decimal(&mut row, "accounts_payable", self.accounts_payable);
        insert_string(
            &mut row,
            "accounts_payable_date",
            self.accounts_payable_date.clone(),
        );
        insert_decimal(&mut row, "public_fees", self.public_fees);
        insert_string(&mut row, "public_fees_date", self.public_fees_date.clone());
        insert_decimal(&mut row, "salary_expenses", self.salary_expenses);
        insert_string(
            &mut row,
            "salary_expenses_date",
            self.salary_expenses_date.clone(),
        );
        row
    }

    /// Row fragment for the company snapshot: the same subset, with
    /// `result` landing in the cached `result_ytd`.
    #[must_use]
    pub fn snapshot_row(&self) -> Row {
        let mut row = self.report_row();
        if let Some(result) = row.swap_remove("result") {
            row.insert("result_ytd".into(), result);
        }
        row
    }

    /// Reads the optional field subset out of a persisted report row.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            revenue: decode::opt_decimal_field(row, "revenue"),
            revenue_date: decode::opt_string_field(row, "revenue_date"),
            expenses: decode::opt_decimal_field(row, "expenses"),
            expenses_date: decode::opt_string_field(row, "expenses_date"),
            result: decode::opt_decimal_field(row, "result"),
            liquidity: decode::opt_decimal_field(row, "liquidity"),
            liquidity_date: decode::opt_string_field(row, "liquidity_date"),
            receivables: decode::opt_decimal_field(row, "receivables"),
            receivables_date: decode::opt_string_field(row, "receivables_date"),
            accounts_payable: decode::opt_decimal_field(row, "accounts_payable"),
            accounts_payable_date: decode::opt_string_field(row, "accounts_payable_date"),
            public_fees: decode::opt_decimal_field(row, "public_fees"),
            public_fees_date: decode::opt_string_field(row, "public_fees_date"),
            salary_expenses: decode::opt_decimal_field(row, "salary_expenses"),
            salary_expenses_date: decode::opt_string_field(row, "salary_expenses_date"),
        }
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

/// A persisted report, reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Row id.
    pub id: ReportId,
    /// Company this report belongs to.
    pub company_id: CompanyId,
    /// Name of the submitting user.
    pub author_name: String,
    /// Submission date (ISO display string).
    pub date: String,
    /// Free-text comment.
    pub comment: String,
    /// Where the figures came from.
    pub source: ReportSource,
    /// Lifecycle status.
    pub status: ReportStatus,
    /// The optional financial field subset.
    #[serde(flatten)]
    pub fields: ReportFields,
    /// Controller who approved, once approved.
    pub approved_by: Option<UserId>,
    /// Approval timestamp, once approved.
    pub approved_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Reconciles a persisted report row.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: ReportId::new(decode::i64_field(row, "id")),
            company_id: CompanyId::new(decode::i64_field(row, "company_id")),
            author_name: decode::string_field(row, "author_name"),
            date: decode::string_field(row, "date"),
            comment: decode::string_field(row, "comment"),
            source: decode::field(row, "source")
                .and_then(Value::as_str)
                .and_then(ReportSource::parse)
                .unwrap_or(ReportSource::Manuell),
            status: decode::field(row, "status")
                .and_then(Value::as_str)
                .and_then(ReportStatus::parse)
                .unwrap_or(ReportStatus::Submitted),
            fields: ReportFields::from_row(row),
            approved_by: decode::field(row, "approved_by")
                .and_then(Value::as_i64)
                .map(UserId::new),
            approved_at: decode::opt_string_field(row, "approved_at")
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Input for submitting a report.
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    /// Submission date.
    pub date: NaiveDate,
    /// Free-text comment.
    pub comment: String,
    /// Where the figures came from.
    pub source: ReportSource,
    /// The supplied financial subset.
    pub fields: ReportFields,
}

/// Input for editing an unapproved report.
#[derive(Debug, Clone, Default)]
pub struct ReportEdit {
    /// Replacement comment.
    pub comment: Option<String>,
    /// Replacement submission date.
    pub date: Option<NaiveDate>,
    /// Replacement source.
    pub source: Option<ReportSource>,
    /// Field updates, same partial semantics as submission.
    pub fields: ReportFields,
}
