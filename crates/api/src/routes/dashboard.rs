//! Dashboard route.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use konsern_core::access::visible_companies;
use konsern_core::budget::DeviationMode;
use konsern_core::dashboard;

use crate::{AppState, middleware::AuthUser};

use super::error_response;

/// Creates the dashboard routes (auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// Query parameters for the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Deviation display mode override.
    pub mode: Option<String>,
}

/// GET `/dashboard` - the viewer's assembled dashboard snapshot.
async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let mode = match query.mode.as_deref() {
        None => state.ctx.default_mode(),
        Some(raw) => match DeviationMode::parse(raw) {
            Some(mode) => mode,
            None => return error_response(400, "VALIDATION_ERROR", "unknown deviation mode"),
        },
    };

    let companies = visible_companies(&user, state.ctx.cached_companies().await);
    let snapshot = dashboard::build(companies, Utc::now().date_naive(), mode);
    Json(snapshot).into_response()
}
