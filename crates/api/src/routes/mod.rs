//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use konsern_core::access::{User, accessible_company_ids};
use konsern_core::reports::ReportError;
use konsern_shared::error::AppError;
use konsern_shared::types::{CompanyId, UserRole};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod companies;
pub mod dashboard;
pub mod forecasts;
pub mod health;
pub mod reports;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(companies::routes())
        .merge(dashboard::routes())
        .merge(reports::routes())
        .merge(users::routes())
        .merge(forecasts::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Builds a JSON error response.
pub(crate) fn error_response(status: u16, error: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

/// Maps a core error onto a JSON response.
pub(crate) fn app_error(err: &AppError) -> Response {
    error_response(err.status_code(), err.error_code(), &err.to_string())
}

/// Maps a ledger error onto a JSON response.
pub(crate) fn report_error(err: &ReportError) -> Response {
    error_response(err.status_code(), err.error_code(), &err.to_string())
}

/// Rejects non-controllers.
pub(crate) fn require_controller(user: &User) -> Result<(), Response> {
    if user.role == UserRole::Controller {
        Ok(())
    } else {
        Err(error_response(
            403,
            "CONTROLLER_REQUIRED",
            "Controller role required",
        ))
    }
}

/// Rejects viewers without access to the company.
pub(crate) fn require_company_access(user: &User, company_id: CompanyId) -> Result<(), Response> {
    let granted = match user.role {
        UserRole::Controller => true,
        UserRole::Leader => accessible_company_ids(user).contains(&company_id),
    };
    if granted {
        Ok(())
    } else {
        Err(error_response(
            403,
            "FORBIDDEN",
            "No access to this company",
        ))
    }
}

/// Refreshes the context caches after a mutation so the next read never
/// sees a stale deviation. A failed refresh is logged; the background
/// poll repairs it on the next tick.
pub(crate) async fn refresh(state: &AppState) {
    if let Err(err) = state.ctx.reload().await {
        warn!(error = %err, "cache refresh after mutation failed");
    }
}
