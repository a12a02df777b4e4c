//! Demo tenant seeding for development and testing.
//!
//! Seeds one holding-company group: a controller, two leaders, three
//! companies with budgets, access grants, a report history, and a few
//! forecasts. Idempotent: an already-seeded store is left alone.

use serde_json::{Value, json};
use tracing::info;

use konsern_shared::error::AppResult;
use konsern_store::{Row, RowFilter, TableStore, tables};

/// The demo group id, consistent for all seeds.
pub const DEMO_GROUP_ID: i64 = 1;

fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Seeds the demo tenant. Skips everything if companies already exist.
pub async fn seed(store: &dyn TableStore) -> AppResult<()> {
    let existing = store.fetch_rows(tables::COMPANIES, &RowFilter::all()).await?;
    if !existing.is_empty() {
        info!("store already seeded, skipping");
        return Ok(());
    }

    info!("seeding demo tenant");

    store
        .insert_rows(
            tables::COMPANIES,
            vec![
                row(&[
                    ("group_id", json!(DEMO_GROUP_ID)),
                    ("name", json!("ALF")),
                    ("full_name", json!("Alfheim Bygg AS")),
                    ("revenue", json!(1250000)),
                    ("expenses", json!(980000)),
                    ("result_ytd", json!(270000)),
                    ("liquidity", json!(430000)),
                    ("liquidity_date", json!("2026-07-31")),
                    ("receivables", json!(215000)),
                    ("accounts_payable", json!(130000)),
                    ("public_fees", json!(56000)),
                    ("salary_expenses", json!(410000)),
                    ("budget_total", json!(2400000)),
                    ("budget_mode", json!("annual")),
                    ("sort_order", json!(0)),
                    ("prev_liquidity", json!(390000)),
                    ("prev_deviation", json!(-4)),
                ]),
                row(&[
                    ("group_id", json!(DEMO_GROUP_ID)),
                    ("name", json!("BRI")),
                    ("full_name", json!("Brimstad Eiendom AS")),
                    ("revenue", json!(720000)),
                    ("expenses", json!(510000)),
                    ("result_ytd", json!(210000)),
                    ("liquidity", json!(180000)),
                    ("receivables", json!(95000)),
                    // Legacy shape on purpose: camelCase key, brace-string months.
                    ("budgetTotal", json!(1200000)),
                    (
                        "budgetMonths",
                        json!("{100000,100000,100000,100000,100000,100000,100000,100000,100000,100000,100000,100000}"),
                    ),
                    ("budget_mode", json!("monthly")),
                    ("sortOrder", json!(1)),
                ]),
                row(&[
                    ("group_id", json!(DEMO_GROUP_ID)),
                    ("name", json!("CET")),
                    ("full_name", json!("Cetus Marine AS")),
                    ("budget_total", json!(900000)),
                    ("budget_mode", json!("quarterly")),
                    ("sort_order", json!(2)),
                ]),
            ],
        )
        .await?;

    store
        .insert_rows(
            tables::USERS,
            vec![
                row(&[
                    ("group_id", json!(DEMO_GROUP_ID)),
                    ("full_name", json!("Kari Kontroller")),
                    ("email", json!("kari@konsern.dev")),
                    ("role", json!("controller")),
                ]),
                row(&[
                    ("group_id", json!(DEMO_GROUP_ID)),
                    ("full_name", json!("Bodil Berg")),
                    ("email", json!("bodil@konsern.dev")),
                    ("role", json!("leader")),
                ]),
                row(&[
                    ("group_id", json!(DEMO_GROUP_ID)),
                    ("full_name", json!("Lars Lien")),
                    ("email", json!("lars@konsern.dev")),
                    ("role", json!("leader")),
                    // Pre-multi-access account: single legacy pointer only.
                    ("company_id", json!(2)),
                ]),
            ],
        )
        .await?;

    store
        .insert_rows(
            tables::COMPANY_ACCESS,
            vec![
                row(&[("user_id", json!(2)), ("company_id", json!(1))]),
                row(&[("user_id", json!(2)), ("company_id", json!(3))]),
            ],
        )
        .await?;

    store
        .insert_rows(
            tables::REPORTS,
            vec![
                row(&[
                    ("company_id", json!(1)),
                    ("author_name", json!("Bodil Berg")),
                    ("date", json!("2026-06-30")),
                    ("comment", json!("Halvårstall")),
                    ("source", json!("Tripletex")),
                    ("status", json!("approved")),
                    ("revenue", json!(1250000)),
                    ("expenses", json!(980000)),
                    ("result", json!(270000)),
                    ("liquidity", json!(430000)),
                    ("approved_by", json!(1)),
                    ("approved_at", json!("2026-07-02T09:14:00+00:00")),
                ]),
                row(&[
                    ("company_id", json!(2)),
                    ("author_name", json!("Lars Lien")),
                    ("date", json!("2026-07-15")),
                    ("comment", json!("Likviditet etter salg")),
                    ("source", json!("Manuell")),
                    ("status", json!("submitted")),
                    ("liquidity", json!(180000)),
                ]),
            ],
        )
        .await?;

    store
        .insert_rows(
            tables::FORECASTS,
            vec![
                row(&[
                    ("company_id", json!(1)),
                    ("year", json!(2026)),
                    ("month", json!(9)),
                    ("expected_in", json!(150000)),
                    ("expected_out", json!(95000)),
                    ("note", json!("Prosjektoppgjør")),
                ]),
                row(&[
                    ("company_id", json!(1)),
                    ("year", json!(2026)),
                    ("month", json!(10)),
                    ("expected_in", json!(60000)),
                    ("expected_out", json!(120000)),
                    ("note", json!("Terminskatt")),
                ]),
            ],
        )
        .await?;

    info!("demo seed complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use konsern_store::MemoryStore;

    use crate::company::reconcile_all;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        seed(&store).await.expect("first seed succeeds");
        seed(&store).await.expect("second seed is a no-op");

        let companies = store
            .fetch_rows(tables::COMPANIES, &RowFilter::all())
            .await
            .expect("fetch succeeds");
        assert_eq!(companies.len(), 3);
    }

    #[tokio::test]
    async fn test_seeded_legacy_shapes_reconcile() {
        let store = MemoryStore::new();
        seed(&store).await.expect("seed succeeds");

        let rows = store
            .fetch_rows(tables::COMPANIES, &RowFilter::all())
            .await
            .expect("fetch succeeds");
        let companies = reconcile_all(&rows);

        // The camelCase/brace-string company still reconciles cleanly.
        let brimstad = companies
            .iter()
            .find(|c| c.name == "BRI")
            .expect("Brimstad seeded");
        assert_eq!(brimstad.budget_total.to_string(), "1200000");
        assert_eq!(brimstad.budget_months.month(0).to_string(), "100000");
    }
}
