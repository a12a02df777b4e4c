//! Forecast persistence and liquidity projection.

use std::sync::Arc;

use rust_decimal::Decimal;

use konsern_shared::error::AppResult;
use konsern_shared::types::CompanyId;
use konsern_store::{RowFilter, TableStore, tables};

use super::types::{Forecast, ForecastEntry};

/// Loads and writes forecast rows.
pub struct ForecastService {
    store: Arc<dyn TableStore>,
}

impl ForecastService {
    /// Creates the service over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// A company's forecasts, chronologically.
    pub async fn list(&self, company_id: CompanyId) -> AppResult<Vec<Forecast>> {
        let rows = self
            .store
            .fetch_rows(
                tables::FORECASTS,
                &RowFilter::all().eq("company_id", company_id.into_inner()),
            )
            .await?;
        let mut forecasts: Vec<Forecast> = rows.iter().map(Forecast::from_row).collect();
        forecasts.sort_by_key(|f| (f.year, f.month));
        Ok(forecasts)
    }

    /// Writes a forecast, replacing any existing row for the same
    /// `(company, year, month)`.
    pub async fn upsert(&self, company_id: CompanyId, entry: ForecastEntry) -> AppResult<Forecast> {
        let existing = self
            .store
            .fetch_rows(
                tables::FORECASTS,
                &RowFilter::all()
                    .eq("company_id", company_id.into_inner())
                    .eq("year", i64::from(entry.year))
                    .eq("month", i64::from(entry.month)),
            )
            .await?;

        let rows = if let Some(id) = existing
            .first()
            .and_then(|row| row.get("id"))
            .and_then(serde_json::Value::as_i64)
        {
            self.store
                .patch_rows(tables::FORECASTS, id, entry.into_row(company_id))
                .await?
        } else {
            self.store
                .insert_rows(tables::FORECASTS, vec![entry.into_row(company_id)])
                .await?
        };

        Ok(rows.first().map(Forecast::from_row).unwrap_or(Forecast {
            id: konsern_shared::types::ForecastId::new(0),
            company_id,
            year: 0,
            month: 0,
            expected_in: Decimal::ZERO,
            expected_out: Decimal::ZERO,
            note: String::new(),
        }))
    }
}

/// Projects liquidity across the given forecasts, oldest first.
///
/// Each step applies `balance + expected_in - expected_out`; the returned
/// vector holds the balance after each forecast month.
#[must_use]
pub fn project_liquidity(starting_liquidity: Decimal, forecasts: &[Forecast]) -> Vec<Decimal> {
    let mut balance = starting_liquidity;
    forecasts
        .iter()
        .map(|forecast| {
            balance = balance + forecast.expected_in - forecast.expected_out;
            balance
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use konsern_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn entry(year: i32, month: u32, expected_in: Decimal, expected_out: Decimal) -> ForecastEntry {
        ForecastEntry {
            year,
            month,
            expected_in,
            expected_out,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let service = ForecastService::new(Arc::new(MemoryStore::new()));
        let company = CompanyId::new(1);

        let first = service
            .upsert(company, entry(2026, 9, dec!(1000), dec!(400)))
            .await
            .expect("insert succeeds");
        assert_eq!(first.expected_in, dec!(1000));

        let second = service
            .upsert(company, entry(2026, 9, dec!(2000), dec!(400)))
            .await
            .expect("replace succeeds");
        assert_eq!(second.id, first.id);
        assert_eq!(second.expected_in, dec!(2000));

        let all = service.list(company).await.expect("list succeeds");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_chronological() {
        let service = ForecastService::new(Arc::new(MemoryStore::new()));
        let company = CompanyId::new(1);
        for (year, month) in [(2027, 1), (2026, 11), (2026, 9)] {
            service
                .upsert(company, entry(year, month, Decimal::ZERO, Decimal::ZERO))
                .await
                .expect("upsert succeeds");
        }

        let all = service.list(company).await.expect("list succeeds");
        let keys: Vec<(i32, u32)> = all.iter().map(|f| (f.year, f.month)).collect();
        assert_eq!(keys, vec![(2026, 9), (2026, 11), (2027, 1)]);
    }

    #[test]
    fn test_project_liquidity_running_balance() {
        let forecasts = vec![
            Forecast {
                id: konsern_shared::types::ForecastId::new(1),
                company_id: CompanyId::new(1),
                year: 2026,
                month: 9,
                expected_in: dec!(1000),
                expected_out: dec!(400),
                note: String::new(),
            },
            Forecast {
                id: konsern_shared::types::ForecastId::new(2),
                company_id: CompanyId::new(1),
                year: 2026,
                month: 10,
                expected_in: dec!(0),
                expected_out: dec!(800),
                note: String::new(),
            },
        ];

        let projection = project_liquidity(dec!(5000), &forecasts);
        assert_eq!(projection, vec![dec!(5600), dec!(4800)]);
    }

    #[test]
    fn test_project_liquidity_empty() {
        assert!(project_liquidity(dec!(5000), &[]).is_empty());
    }
}
