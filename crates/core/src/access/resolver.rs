//! Pure access-resolution logic.

use konsern_shared::types::{CompanyId, UserRole};

use crate::company::Company;

use super::types::{AccessGrant, User};

/// Placeholder shown when no leader is assigned to a company.
pub const NO_MANAGER: &str = "No manager assigned";

/// The companies a user may see, by id.
///
/// An empty grant set falls back to the deprecated single pointer; a user
/// with neither sees nothing - that is an empty set, not an error.
#[must_use]
pub fn accessible_company_ids(user: &User) -> Vec<CompanyId> {
    if !user.company_access.is_empty() {
        return user.company_access.clone();
    }
    user.legacy_company_id.into_iter().collect()
}

/// Filters a group's companies down to what `user` may see.
///
/// Controllers see everything; the input is already group-scoped.
#[must_use]
pub fn visible_companies(user: &User, all: Vec<Company>) -> Vec<Company> {
    match user.role {
        UserRole::Controller => all,
        UserRole::Leader => {
            let accessible = accessible_company_ids(user);
            all.into_iter()
                .filter(|company| accessible.contains(&company.id))
                .collect()
        }
    }
}

/// Attaches grant rows to their users.
pub fn attach_grants(users: &mut [User], grants: &[AccessGrant]) {
    for user in users.iter_mut() {
        user.company_access = grants
            .iter()
            .filter(|grant| grant.user_id == user.id)
            .map(|grant| grant.company_id)
            .collect();
    }
}

/// Derives the comma-joined `manager` display string for one company.
///
/// Every leader with access counts - via the grant set, union the legacy
/// pointer - deduplicated by user id, in the order the users were loaded.
/// Idempotent: unchanged assignments produce the same string.
#[must_use]
pub fn manager_display(company_id: CompanyId, users: &[User]) -> String {
    let mut seen = Vec::new();
    let mut names = Vec::new();

    for user in users {
        if user.role != UserRole::Leader || seen.contains(&user.id) {
            continue;
        }
        let granted = user.company_access.contains(&company_id)
            || user.legacy_company_id == Some(company_id);
        if granted {
            seen.push(user.id);
            names.push(user.full_name.clone());
        }
    }

    if names.is_empty() {
        NO_MANAGER.to_string()
    } else {
        names.join(", ")
    }
}
