//! User and access-grant types.

use serde::Serialize;
use serde_json::Value;

use konsern_shared::types::{CompanyId, GroupId, UserId, UserRole};
use konsern_store::Row;

use crate::decode;

/// A user of a holding-company group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Row id.
    pub id: UserId,
    /// Owning tenant.
    pub group_id: GroupId,
    /// Display name.
    pub full_name: String,
    /// Contact address; also the identity-widget subject.
    pub email: String,
    /// Role within the group.
    pub role: UserRole,
    /// Deprecated single-company pointer, honored only when the grant set
    /// is empty.
    pub legacy_company_id: Option<CompanyId>,
    /// Resolved multi-company grant set.
    pub company_access: Vec<CompanyId>,
}

impl User {
    /// Reconciles a persisted user row. Grants are attached separately.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: UserId::new(decode::i64_field(row, "id")),
            group_id: GroupId::new(decode::i64_field(row, "group_id")),
            full_name: decode::string_field(row, "full_name"),
            email: decode::string_field(row, "email"),
            role: decode::field(row, "role")
                .and_then(Value::as_str)
                .and_then(UserRole::parse)
                .unwrap_or(UserRole::Leader),
            legacy_company_id: decode::field(row, "company_id")
                .and_then(Value::as_i64)
                .map(CompanyId::new),
            company_access: Vec::new(),
        }
    }
}

/// A row of the many-to-many leader-to-company join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGrant {
    /// Grant row id.
    pub id: i64,
    /// The user holding access.
    pub user_id: UserId,
    /// The company accessed.
    pub company_id: CompanyId,
}

impl AccessGrant {
    /// Reconciles a persisted grant row.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: decode::i64_field(row, "id"),
            user_id: UserId::new(decode::i64_field(row, "user_id")),
            company_id: CompanyId::new(decode::i64_field(row, "company_id")),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Display name.
    pub full_name: String,
    /// Contact address.
    pub email: String,
    /// Role within the group.
    pub role: UserRole,
    /// Initial grant set.
    pub company_access: Vec<CompanyId>,
}

impl UserDraft {
    /// Builds the snake_case user row to insert.
    #[must_use]
    pub fn into_row(self, group_id: GroupId) -> Row {
        let mut row = Row::new();
        row.insert("group_id".into(), Value::from(group_id.into_inner()));
        row.insert("full_name".into(), Value::String(self.full_name));
        row.insert("email".into(), Value::String(self.email));
        row.insert("role".into(), Value::String(self.role.as_str().to_string()));
        row
    }
}

/// Partial user edit; absent fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name.
    pub full_name: Option<String>,
    /// New contact address.
    pub email: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// Replacement grant set; `None` leaves grants alone.
    pub company_access: Option<Vec<CompanyId>>,
}

impl UserUpdate {
    /// Builds the snake_case patch row (grants are handled separately).
    #[must_use]
    pub fn patch_row(&self) -> Row {
        let mut row = Row::new();
        if let Some(full_name) = &self.full_name {
            row.insert("full_name".into(), Value::String(full_name.clone()));
        }
        if let Some(email) = &self.email {
            row.insert("email".into(), Value::String(email.clone()));
        }
        if let Some(role) = self.role {
            row.insert("role".into(), Value::String(role.as_str().to_string()));
        }
        row
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

    #[test]
    fn test_user_from_row_with_legacy_pointer() {
        let user = User::from_row(&row(&[
            ("id", json!(2)),
            ("groupId", json!(1)),
            ("fullName", json!("Bodil Berg")),
            ("role", json!("leader")),
            ("companyId", json!(7)),
        ]));
        assert_eq!(user.id, UserId::new(2));
        assert_eq!(user.full_name, "Bodil Berg");
        assert_eq!(user.role, UserRole::Leader);
        assert_eq!(user.legacy_company_id, Some(CompanyId::new(7)));
        assert!(user.company_access.is_empty());
    }

    #[test]
    fn test_user_defaults_to_leader() {
        let user = User::from_row(&Row::new());
        assert_eq!(user.role, UserRole::Leader);
        assert_eq!(user.legacy_company_id, None);
    }

    #[test]
    fn test_grant_from_row() {
        let grant = AccessGrant::from_row(&row(&[
            ("id", json!(5)),
            ("userId", json!(2)),
            ("company_id", json!(7)),
        ]));
        assert_eq!(grant.user_id, UserId::new(2));
        assert_eq!(grant.company_id, CompanyId::new(7));
    }
}
