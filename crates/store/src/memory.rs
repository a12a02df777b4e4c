//! In-memory rowstore backend.
//!
//! Used by demo mode, the seeder, and service-level tests. Mimics the
//! remote engine's observable behavior, including the referential guard
//! that blocks deleting a company while dependent reports exist.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Row, RowFilter, StoreError, TableStore, tables};

/// Child tables consulted before a parent row may be deleted.
const DELETE_GUARDS: &[(&str, &str, &str)] =
    &[(tables::COMPANIES, tables::REPORTS, "company_id")];

#[derive(Default)]
struct TableData {
    next_id: i64,
    rows: Vec<Row>,
}

/// In-process [`TableStore`] backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, TableData>>,
}

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn fetch_rows(&self, table: &str, filter: &RowFilter) -> Result<Vec<Row>, StoreError> {
        let inner = self.inner.read().await;
        let rows = inner
            .get(table)
            .map(|data| {
                data.rows
                    .iter()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.inner.write().await;
        let data = inner.entry(table.to_string()).or_default();

        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            let id = match row_id(&row) {
                Some(explicit) => explicit,
                None => {
                    data.next_id += 1;
                    data.next_id
                }
            };
            data.next_id = data.next_id.max(id);
            row.insert("id".to_string(), Value::from(id));
            data.rows.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn patch_rows(&self, table: &str, id: i64, fields: Row) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.inner.write().await;
        let data = inner
            .get_mut(table)
            .ok_or_else(|| StoreError::RowNotFound {
                table: table.to_string(),
                id,
            })?;

        let row = data
            .rows
            .iter_mut()
            .find(|row| row_id(row) == Some(id))
            .ok_or_else(|| StoreError::RowNotFound {
                table: table.to_string(),
                id,
            })?;

        for (key, value) in fields {
            if key == "id" {
                continue;
            }
            row.insert(key, value);
        }
        Ok(vec![row.clone()])
    }

    async fn delete_rows(&self, table: &str, ids: &[i64]) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;

        for (parent, child, fk_column) in DELETE_GUARDS {
            if *parent != table {
                continue;
            }
            let referenced = inner.get(*child).is_some_and(|data| {
                data.rows.iter().any(|row| {
                    row.get(*fk_column)
                        .and_then(Value::as_i64)
                        .is_some_and(|fk| ids.contains(&fk))
                })
            });
            if referenced {
                return Err(StoreError::Rejected {
                    status: 409,
                    message: format!("rows in '{child}' still reference '{parent}'"),
                });
            }
        }

        let Some(data) = inner.get_mut(table) else {
            return Ok(0);
        };
        let before = data.rows.len();
        data.rows
            .retain(|row| !row_id(row).is_some_and(|id| ids.contains(&id)));
        Ok((before - data.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_rows(
                tables::COMPANIES,
                vec![row(&[("name", json!("A"))]), row(&[("name", json!("B"))])],
            )
            .await
            .expect("insert succeeds");

        assert_eq!(row_id(&inserted[0]), Some(1));
        assert_eq!(row_id(&inserted[1]), Some(2));
    }

    #[tokio::test]
    async fn test_insert_respects_explicit_ids() {
        let store = MemoryStore::new();
        store
            .insert_rows(tables::USERS, vec![row(&[("id", json!(10))])])
            .await
            .expect("insert succeeds");
        let inserted = store
            .insert_rows(tables::USERS, vec![row(&[("name", json!("next"))])])
            .await
            .expect("insert succeeds");

        assert_eq!(row_id(&inserted[0]), Some(11));
    }

    #[tokio::test]
    async fn test_fetch_applies_filter() {
        let store = MemoryStore::new();
        store
            .insert_rows(
                tables::REPORTS,
                vec![
                    row(&[("company_id", json!(1))]),
                    row(&[("company_id", json!(2))]),
                ],
            )
            .await
            .expect("insert succeeds");

        let rows = store
            .fetch_rows(tables::REPORTS, &RowFilter::all().eq("company_id", 2))
            .await
            .expect("fetch succeeds");
        assert_eq!(rows.len(), 1);
        assert_eq!(row_id(&rows[0]), Some(2));
    }

    #[tokio::test]
    async fn test_patch_merges_fields() {
        let store = MemoryStore::new();
        store
            .insert_rows(
                tables::COMPANIES,
                vec![row(&[("name", json!("Alpha")), ("liquidity", json!(100))])],
            )
            .await
            .expect("insert succeeds");

        let rows = store
            .patch_rows(tables::COMPANIES, 1, row(&[("liquidity", json!(250))]))
            .await
            .expect("patch succeeds");

        assert_eq!(rows[0].get("liquidity"), Some(&json!(250)));
        assert_eq!(rows[0].get("name"), Some(&json!("Alpha")));
    }

    #[tokio::test]
    async fn test_patch_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .patch_rows(tables::COMPANIES, 99, Row::new())
            .await
            .expect_err("patch fails");
        assert!(matches!(err, StoreError::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_company_blocked_by_dependent_reports() {
        let store = MemoryStore::new();
        store
            .insert_rows(tables::COMPANIES, vec![row(&[("name", json!("Alpha"))])])
            .await
            .expect("insert succeeds");
        store
            .insert_rows(tables::REPORTS, vec![row(&[("company_id", json!(1))])])
            .await
            .expect("insert succeeds");

        let err = store
            .delete_rows(tables::COMPANIES, &[1])
            .await
            .expect_err("delete blocked");
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));

        store
            .delete_rows(tables::REPORTS, &[1])
            .await
            .expect("report delete succeeds");
        let deleted = store
            .delete_rows(tables::COMPANIES, &[1])
            .await
            .expect("company delete succeeds");
        assert_eq!(deleted, 1);
    }
}
