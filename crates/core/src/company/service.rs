//! Company persistence operations.

use std::sync::Arc;

use konsern_shared::error::{AppError, AppResult};
use konsern_shared::types::{CompanyId, GroupId};
use konsern_store::{RowFilter, TableStore, tables};

use super::reconcile::{reconcile, reconcile_all};
use super::types::{Company, CompanyDraft, CompanyUpdate};

/// Loads and mutates company rows through the storage boundary.
pub struct CompanyService {
    store: Arc<dyn TableStore>,
}

impl CompanyService {
    /// Creates the service over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Loads and reconciles every company of a group, display-sorted.
    pub async fn load_all(&self, group_id: GroupId) -> AppResult<Vec<Company>> {
        let rows = self
            .store
            .fetch_rows(
                tables::COMPANIES,
                &RowFilter::all().eq("group_id", group_id.into_inner()),
            )
            .await?;
        Ok(reconcile_all(&rows))
    }

    /// Loads and reconciles one company.
    pub async fn load(&self, id: CompanyId) -> AppResult<Company> {
        let rows = self
            .store
            .fetch_rows(
                tables::COMPANIES,
                &RowFilter::all().eq("id", id.into_inner()),
            )
            .await?;
        rows.first()
            .map(reconcile)
            .ok_or_else(|| AppError::NotFound(format!("company {id}")))
    }

    /// Creates a company at the end of the display order.
    pub async fn create(&self, group_id: GroupId, draft: CompanyDraft) -> AppResult<Company> {
        let existing = self.load_all(group_id).await?;
        let sort_order = existing.len() as i64;

        let inserted = self
            .store
            .insert_rows(tables::COMPANIES, vec![draft.into_row(group_id, sort_order)])
            .await?;
        inserted
            .first()
            .map(reconcile)
            .ok_or_else(|| AppError::Internal("insert returned no rows".into()))
    }

    /// Applies a partial edit, returning the reconciled result.
    pub async fn update(&self, id: CompanyId, update: CompanyUpdate) -> AppResult<Company> {
        let rows = self
            .store
            .patch_rows(tables::COMPANIES, id.into_inner(), update.into_row())
            .await?;
        rows.first()
            .map(reconcile)
            .ok_or_else(|| AppError::NotFound(format!("company {id}")))
    }

    /// Hard-deletes a company.
    ///
    /// The storage layer rejects the delete while dependent reports exist;
    /// that rejection propagates to the caller untouched.
    pub async fn delete(&self, id: CompanyId) -> AppResult<()> {
        self.store
            .delete_rows(tables::COMPANIES, &[id.into_inner()])
            .await?;
        Ok(())
    }

    /// Persists a new display order, one patch per company.
    pub async fn reorder(&self, ordered: &[CompanyId]) -> AppResult<()> {
        for (position, id) in ordered.iter().enumerate() {
            let mut fields = konsern_store::Row::new();
            fields.insert("sort_order".into(), serde_json::Value::from(position as i64));
            self.store
                .patch_rows(tables::COMPANIES, id.into_inner(), fields)
                .await?;
        }
        Ok(())
    }
}
