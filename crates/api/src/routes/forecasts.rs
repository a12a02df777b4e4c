//! Forecast routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use konsern_core::forecast::{Forecast, ForecastEntry, project_liquidity};
use konsern_shared::types::CompanyId;

use crate::{AppState, middleware::AuthUser};

use super::{app_error, error_response, require_company_access};

/// Creates the forecast routes (auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/forecasts", get(list_forecasts))
        .route("/companies/{company_id}/forecasts", put(upsert_forecast))
}

/// Request body for writing a forecast month.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertForecastRequest {
    /// Calendar year.
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    /// Calendar month, 1-12.
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    /// Expected incoming cash.
    pub expected_in: Decimal,
    /// Expected outgoing cash.
    pub expected_out: Decimal,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
}

/// Forecast listing plus the derived liquidity projection.
#[derive(Debug, Serialize)]
pub struct ForecastListResponse {
    /// The stored forecast months, chronologically.
    pub forecasts: Vec<Forecast>,
    /// Running liquidity after each forecast month, starting from the
    /// company's current liquidity.
    pub projected_liquidity: Vec<Decimal>,
}

/// GET `/companies/{company_id}/forecasts` - forecasts and projection.
async fn list_forecasts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(company_id): Path<i64>,
) -> Response {
    let company_id = CompanyId::new(company_id);
    if let Err(response) = require_company_access(&user, company_id) {
        return response;
    }

    let forecasts = match state.ctx.forecasts().list(company_id).await {
        Ok(forecasts) => forecasts,
        Err(err) => return app_error(&err),
    };

    let starting_liquidity = state
        .ctx
        .cached_companies()
        .await
        .iter()
        .find(|company| company.id == company_id)
        .map(|company| company.liquidity)
        .unwrap_or_default();

    Json(ForecastListResponse {
        projected_liquidity: project_liquidity(starting_liquidity, &forecasts),
        forecasts,
    })
    .into_response()
}

/// PUT `/companies/{company_id}/forecasts` - write one forecast month.
async fn upsert_forecast(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(company_id): Path<i64>,
    Json(body): Json<UpsertForecastRequest>,
) -> Response {
    let company_id = CompanyId::new(company_id);
    if let Err(response) = require_company_access(&user, company_id) {
        return response;
    }
    if let Err(err) = body.validate() {
        return error_response(400, "VALIDATION_ERROR", &err.to_string());
    }

    let entry = ForecastEntry {
        year: body.year,
        month: body.month,
        expected_in: body.expected_in,
        expected_out: body.expected_out,
        note: body.note,
    };
    match state.ctx.forecasts().upsert(company_id, entry).await {
        Ok(forecast) => Json(forecast).into_response(),
        Err(err) => app_error(&err),
    }
}
