//! Table names used by the application.

/// Subsidiary companies.
pub const COMPANIES: &str = "companies";
/// Append-only report log.
pub const REPORTS: &str = "reports";
/// Users of a holding-company group.
pub const USERS: &str = "users";
/// Many-to-many leader-to-company access grants.
pub const COMPANY_ACCESS: &str = "company_access";
/// Per-company, per-month cash-flow forecasts.
pub const FORECASTS: &str = "forecasts";
/// Best-effort audit trail.
pub const ACTIVITY_LOG: &str = "activity_log";
