//! Role and access-grant resolution.
//!
//! Controllers see their whole group. Leaders see the companies in their
//! grant set - or, for accounts predating the multi-company model, the
//! single legacy company pointer. The same resolution feeds the derived
//! per-company `manager` display string.

pub mod resolver;
pub mod service;
pub mod types;

pub use resolver::{NO_MANAGER, accessible_company_ids, manager_display, visible_companies};
pub use service::AccessService;
pub use types::{AccessGrant, User, UserDraft, UserUpdate};
