//! Dashboard data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use konsern_shared::types::CompanyId;

use crate::budget::{DeviationMode, deviation};
use crate::company::{Company, ComputedCompany, computed};

/// The full dashboard view for one group at one reference point.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Reference date the deviations were computed against.
    pub on: NaiveDate,
    /// Display mode in effect.
    pub mode: DeviationMode,
    /// Aggregates across the visible companies.
    pub totals: GroupTotals,
    /// Per-company computed rows, display-sorted.
    pub companies: Vec<ComputedCompany>,
    /// Risk comparison against the previous period.
    pub risk: Vec<RiskEntry>,
}

/// Aggregates across the visible companies.
#[derive(Debug, Clone, Serialize)]
pub struct GroupTotals {
    /// Summed revenue.
    pub revenue: Decimal,
    /// Summed expenses.
    pub expenses: Decimal,
    /// Summed cached results.
    pub result_ytd: Decimal,
    /// Summed YTD budget targets.
    pub budget_ytd: Decimal,
    /// Aggregate deviation.
    pub deviation: Decimal,
    /// Aggregate deviation percent against the summed target.
    pub deviation_percent: Decimal,
    /// Summed liquidity.
    pub liquidity: Decimal,
}

/// Direction of a metric against its comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Better than the comparison period.
    Improving,
    /// Unchanged.
    Steady,
    /// Worse than the comparison period.
    Worsening,
}

impl Trend {
    /// Compares a higher-is-better metric against its previous value.
    #[must_use]
    pub fn of(current: Decimal, previous: Decimal) -> Self {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Self::Improving,
            std::cmp::Ordering::Equal => Self::Steady,
            std::cmp::Ordering::Less => Self::Worsening,
        }
    }
}

/// Risk row: one company's liquidity and deviation against the previous
/// period. The comparison values are externally fed, never computed here.
#[derive(Debug, Clone, Serialize)]
pub struct RiskEntry {
    /// Company id.
    pub company_id: CompanyId,
    /// Company short code.
    pub name: String,
    /// Current liquidity.
    pub liquidity: Decimal,
    /// Comparison-period liquidity.
    pub prev_liquidity: Decimal,
    /// Liquidity direction.
    pub liquidity_trend: Trend,
    /// Current deviation percent.
    pub deviation_percent: Decimal,
    /// Comparison-period deviation percent.
    pub prev_deviation: Decimal,
    /// Deviation direction.
    pub deviation_trend: Trend,
}

/// Assembles the dashboard for a set of (already visibility-filtered,
/// display-sorted) companies.
#[must_use]
pub fn build(companies: Vec<Company>, on: NaiveDate, mode: DeviationMode) -> DashboardSnapshot {
    let computed_rows: Vec<ComputedCompany> = companies
        .into_iter()
        .map(|company| computed(company, on, mode))
        .collect();

    let mut totals = GroupTotals {
        revenue: Decimal::ZERO,
        expenses: Decimal::ZERO,
        result_ytd: Decimal::ZERO,
        budget_ytd: Decimal::ZERO,
        deviation: Decimal::ZERO,
        deviation_percent: Decimal::ZERO,
        liquidity: Decimal::ZERO,
    };
    for row in &computed_rows {
        totals.revenue += row.company.revenue;
        totals.expenses += row.company.expenses;
        totals.result_ytd += row.company.result_ytd;
        totals.budget_ytd += row.calculated_budget_ytd;
        totals.liquidity += row.company.liquidity;
    }
    let aggregate = deviation(totals.result_ytd, totals.budget_ytd);
    totals.deviation = aggregate.deviation;
    totals.deviation_percent = aggregate.deviation_percent;

    let risk = computed_rows
        .iter()
        .map(|row| RiskEntry {
            company_id: row.company.id,
            name: row.company.name.clone(),
            liquidity: row.company.liquidity,
            prev_liquidity: row.company.prev_liquidity,
            liquidity_trend: Trend::of(row.company.liquidity, row.company.prev_liquidity),
            deviation_percent: row.calculated_deviation_percent,
            prev_deviation: row.company.prev_deviation,
            deviation_trend: Trend::of(
                row.calculated_deviation_percent,
                row.company.prev_deviation,
            ),
        })
        .collect();

    DashboardSnapshot {
        on,
        mode,
        totals,
        companies: computed_rows,
        risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use konsern_store::Row;

    use crate::company::reconcile;

    fn company(pairs: &[(&str, serde_json::Value)]) -> Company {
        let row: Row = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        reconcile(&row)
    }

    fn june_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date")
    }

    #[test]
    fn test_totals_and_aggregate_deviation() {
        let companies = vec![
            company(&[
                ("id", json!(1)),
                ("name", json!("A")),
                ("revenue", json!(100000)),
                ("expenses", json!(40000)),
                ("result_ytd", json!(60000)),
                ("liquidity", json!(10000)),
                ("budget_total", json!(120000)),
            ]),
            company(&[
                ("id", json!(2)),
                ("name", json!("B")),
                ("revenue", json!(50000)),
                ("expenses", json!(10000)),
                ("result_ytd", json!(40000)),
                ("liquidity", json!(5000)),
                ("budget_total", json!(120000)),
            ]),
        ];

        let snapshot = build(companies, june_15(), DeviationMode::MonthEnd);

        assert_eq!(snapshot.totals.revenue, dec!(150000));
        assert_eq!(snapshot.totals.result_ytd, dec!(100000));
        // Two even 120k budgets: 50k target each through May.
        assert_eq!(snapshot.totals.budget_ytd, dec!(100000));
        assert_eq!(snapshot.totals.deviation, Decimal::ZERO);
        assert_eq!(snapshot.totals.deviation_percent, Decimal::ZERO);
        assert_eq!(snapshot.companies.len(), 2);
    }

    #[test]
    fn test_risk_trends() {
        let companies = vec![company(&[
            ("id", json!(1)),
            ("name", json!("A")),
            ("liquidity", json!(5000)),
            ("prev_liquidity", json!(9000)),
            ("prev_deviation", json!(-3)),
        ])];

        let snapshot = build(companies, june_15(), DeviationMode::MonthEnd);
        let risk = &snapshot.risk[0];

        assert_eq!(risk.liquidity_trend, Trend::Worsening);
        // Zero budget: current deviation percent is 0, previous was -3.
        assert_eq!(risk.deviation_trend, Trend::Improving);
    }

    #[test]
    fn test_empty_group_is_all_zero() {
        let snapshot = build(Vec::new(), june_15(), DeviationMode::ProRatedToday);
        assert_eq!(snapshot.totals.revenue, Decimal::ZERO);
        assert_eq!(snapshot.totals.deviation_percent, Decimal::ZERO);
        assert!(snapshot.companies.is_empty());
        assert!(snapshot.risk.is_empty());
    }
}
