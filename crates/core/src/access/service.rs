//! User directory and manager-name synchronization.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use konsern_shared::error::{AppError, AppResult};
use konsern_shared::types::{CompanyId, GroupId, UserId};
use konsern_store::{Row, RowFilter, TableStore, tables};

use super::resolver::{attach_grants, manager_display};
use super::types::{AccessGrant, User, UserDraft, UserUpdate};

/// Loads and mutates users and their access grants.
pub struct AccessService {
    store: Arc<dyn TableStore>,
}

impl AccessService {
    /// Creates the service over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Loads every user of a group with their grant sets attached.
    pub async fn load_users(&self, group_id: GroupId) -> AppResult<Vec<User>> {
        let user_rows = self
            .store
            .fetch_rows(
                tables::USERS,
                &RowFilter::all().eq("group_id", group_id.into_inner()),
            )
            .await?;
        let mut users: Vec<User> = user_rows.iter().map(User::from_row).collect();

        let grant_rows = self
            .store
            .fetch_rows(tables::COMPANY_ACCESS, &RowFilter::all())
            .await?;
        let grants: Vec<AccessGrant> = grant_rows.iter().map(AccessGrant::from_row).collect();

        attach_grants(&mut users, &grants);
        Ok(users)
    }

    /// Looks up one user of a group by id.
    pub async fn find_user(&self, group_id: GroupId, id: UserId) -> AppResult<User> {
        self.load_users(group_id)
            .await?
            .into_iter()
            .find(|user| user.id == id)
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))
    }

    /// Creates a user and their initial grant rows.
    ///
    /// Returns the user plus the companies whose `manager` string now
    /// needs re-syncing.
    pub async fn create_user(
        &self,
        group_id: GroupId,
        draft: UserDraft,
    ) -> AppResult<(User, Vec<CompanyId>)> {
        let access = draft.company_access.clone();
        let inserted = self
            .store
            .insert_rows(tables::USERS, vec![draft.into_row(group_id)])
            .await?;
        let mut user = inserted
            .first()
            .map(User::from_row)
            .ok_or_else(|| AppError::Internal("insert returned no rows".into()))?;

        if !access.is_empty() {
            let grant_rows: Vec<Row> = access
                .iter()
                .map(|company_id| grant_row(user.id, *company_id))
                .collect();
            self.store
                .insert_rows(tables::COMPANY_ACCESS, grant_rows)
                .await?;
        }
        user.company_access.clone_from(&access);
        Ok((user, access))
    }

    /// Applies a partial user edit, replacing the grant set when one is
    /// supplied.
    ///
    /// Returns the affected companies: the union of old and new grants,
    /// since a removed grant changes that company's manager string too.
    pub async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> AppResult<Vec<CompanyId>> {
        let patch = update.patch_row();
        if !patch.is_empty() {
            self.store
                .patch_rows(tables::USERS, id.into_inner(), patch)
                .await?;
        }

        let mut affected = Vec::new();
        if let Some(new_access) = update.company_access {
            let old_grants = self.grants_for(id).await?;
            for grant in &old_grants {
                push_unique(&mut affected, grant.company_id);
            }
            for company_id in &new_access {
                push_unique(&mut affected, *company_id);
            }

            let old_ids: Vec<i64> = old_grants.iter().map(|grant| grant.id).collect();
            if !old_ids.is_empty() {
                self.store
                    .delete_rows(tables::COMPANY_ACCESS, &old_ids)
                    .await?;
            }
            if !new_access.is_empty() {
                let grant_rows: Vec<Row> = new_access
                    .iter()
                    .map(|company_id| grant_row(id, *company_id))
                    .collect();
                self.store
                    .insert_rows(tables::COMPANY_ACCESS, grant_rows)
                    .await?;
            }
        }
        Ok(affected)
    }

    /// Deletes a user and their grant rows.
    ///
    /// Returns the affected companies, including the legacy pointer.
    pub async fn delete_user(&self, group_id: GroupId, id: UserId) -> AppResult<Vec<CompanyId>> {
        let user = self.find_user(group_id, id).await?;

        let mut affected = Vec::new();
        let grants = self.grants_for(id).await?;
        for grant in &grants {
            push_unique(&mut affected, grant.company_id);
        }
        if let Some(legacy) = user.legacy_company_id {
            push_unique(&mut affected, legacy);
        }

        let grant_ids: Vec<i64> = grants.iter().map(|grant| grant.id).collect();
        if !grant_ids.is_empty() {
            self.store
                .delete_rows(tables::COMPANY_ACCESS, &grant_ids)
                .await?;
        }
        self.store
            .delete_rows(tables::USERS, &[id.into_inner()])
            .await?;
        Ok(affected)
    }

    /// Recomputes the `manager` display string for each given company.
    ///
    /// Best-effort, not transactional: a failed patch is logged and the
    /// batch continues. Idempotent, so callers may simply retry. Returns
    /// how many companies were updated.
    pub async fn sync_manager_names(
        &self,
        group_id: GroupId,
        company_ids: &[CompanyId],
    ) -> AppResult<usize> {
        let users = self.load_users(group_id).await?;

        let mut updated = 0;
        for company_id in company_ids {
            let display = manager_display(*company_id, &users);
            let mut fields = Row::new();
            fields.insert("manager".into(), Value::String(display));

            match self
                .store
                .patch_rows(tables::COMPANIES, company_id.into_inner(), fields)
                .await
            {
                Ok(_) => updated += 1,
                Err(err) => {
                    warn!(company = %company_id, error = %err, "manager sync failed, continuing");
                }
            }
        }
        Ok(updated)
    }

    async fn grants_for(&self, user_id: UserId) -> AppResult<Vec<AccessGrant>> {
        let rows = self
            .store
            .fetch_rows(
                tables::COMPANY_ACCESS,
                &RowFilter::all().eq("user_id", user_id.into_inner()),
            )
            .await?;
        Ok(rows.iter().map(AccessGrant::from_row).collect())
    }
}

fn grant_row(user_id: UserId, company_id: CompanyId) -> Row {
    let mut row = Row::new();
    row.insert("user_id".into(), Value::from(user_id.into_inner()));
    row.insert("company_id".into(), Value::from(company_id.into_inner()));
    row
}

fn push_unique(ids: &mut Vec<CompanyId>, id: CompanyId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use konsern_shared::types::UserRole;
    use konsern_store::MemoryStore;
    use serde_json::json;

    use crate::company::reconcile;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    async fn seeded() -> (AccessService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_rows(
                tables::COMPANIES,
                vec![
                    row(&[("group_id", json!(1)), ("name", json!("A"))]),
                    row(&[("group_id", json!(1)), ("name", json!("B"))]),
                ],
            )
            .await
            .expect("seed companies");
        (AccessService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_user_with_grants() {
        let (service, _) = seeded().await;
        let (user, affected) = service
            .create_user(
                GroupId::new(1),
                UserDraft {
                    full_name: "Bodil Berg".into(),
                    email: "bodil@example.no".into(),
                    role: UserRole::Leader,
                    company_access: vec![CompanyId::new(1), CompanyId::new(2)],
                },
            )
            .await
            .expect("create succeeds");

        assert_eq!(user.company_access.len(), 2);
        assert_eq!(affected, vec![CompanyId::new(1), CompanyId::new(2)]);

        let loaded = service
            .load_users(GroupId::new(1))
            .await
            .expect("load succeeds");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].company_access.len(), 2);
    }

    #[tokio::test]
    async fn test_update_user_replaces_grants_and_reports_union() {
        let (service, _) = seeded().await;
        let (user, _) = service
            .create_user(
                GroupId::new(1),
                UserDraft {
                    full_name: "Bodil".into(),
                    email: String::new(),
                    role: UserRole::Leader,
                    company_access: vec![CompanyId::new(1)],
                },
            )
            .await
            .expect("create succeeds");

        let affected = service
            .update_user(
                user.id,
                UserUpdate {
                    company_access: Some(vec![CompanyId::new(2)]),
                    ..UserUpdate::default()
                },
            )
            .await
            .expect("update succeeds");

        // Both the removed and the added company need re-syncing.
        assert_eq!(affected, vec![CompanyId::new(1), CompanyId::new(2)]);

        let loaded = service
            .load_users(GroupId::new(1))
            .await
            .expect("load succeeds");
        assert_eq!(loaded[0].company_access, vec![CompanyId::new(2)]);
    }

    #[tokio::test]
    async fn test_delete_user_cleans_grants() {
        let (service, store) = seeded().await;
        let (user, _) = service
            .create_user(
                GroupId::new(1),
                UserDraft {
                    full_name: "Bodil".into(),
                    email: String::new(),
                    role: UserRole::Leader,
                    company_access: vec![CompanyId::new(1)],
                },
            )
            .await
            .expect("create succeeds");

        let affected = service
            .delete_user(GroupId::new(1), user.id)
            .await
            .expect("delete succeeds");
        assert_eq!(affected, vec![CompanyId::new(1)]);

        let grants = store
            .fetch_rows(tables::COMPANY_ACCESS, &RowFilter::all())
            .await
            .expect("fetch succeeds");
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_sync_manager_names_writes_display_string() {
        let (service, store) = seeded().await;
        service
            .create_user(
                GroupId::new(1),
                UserDraft {
                    full_name: "A".into(),
                    email: String::new(),
                    role: UserRole::Leader,
                    company_access: vec![CompanyId::new(1)],
                },
            )
            .await
            .expect("create succeeds");

        let updated = service
            .sync_manager_names(GroupId::new(1), &[CompanyId::new(1), CompanyId::new(2)])
            .await
            .expect("sync succeeds");
        assert_eq!(updated, 2);

        let rows = store
            .fetch_rows(tables::COMPANIES, &RowFilter::all())
            .await
            .expect("fetch succeeds");
        let companies: Vec<_> = rows.iter().map(reconcile).collect();
        assert_eq!(companies[0].manager, "A");
        assert_eq!(companies[1].manager, "No manager assigned");
    }

    #[tokio::test]
    async fn test_sync_continues_past_missing_company() {
        let (service, _) = seeded().await;
        let updated = service
            .sync_manager_names(GroupId::new(1), &[CompanyId::new(99), CompanyId::new(1)])
            .await
            .expect("sync succeeds despite missing row");
        // The missing company is logged and skipped; the real one updates.
        assert_eq!(updated, 1);
    }
}
