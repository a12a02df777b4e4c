//! Company management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use konsern_core::budget::{BudgetInput, BudgetMode, DeviationMode};
use konsern_core::company::{CompanyDraft, CompanyUpdate};
use konsern_shared::types::CompanyId;

use crate::{AppState, middleware::AuthUser};

use super::{app_error, error_response, refresh, require_controller};

/// Creates the company routes (auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies))
        .route("/companies", post(create_company))
        .route("/companies/reorder", put(reorder_companies))
        .route("/companies/{id}", axum::routing::patch(update_company))
        .route("/companies/{id}", axum::routing::delete(delete_company))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the company listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Deviation display mode override: `month_end` or `pro_rated_today`.
    pub mode: Option<String>,
}

/// Budget figures as entered in the edit form.
#[derive(Debug, Deserialize)]
pub struct BudgetPayload {
    /// Entry mode: annual, quarterly, or monthly.
    pub mode: String,
    /// Annual figure (annual mode).
    pub annual: Option<Decimal>,
    /// Four quarterly figures (quarterly mode).
    pub quarterly: Option<Vec<Decimal>>,
    /// Twelve monthly figures (monthly mode).
    pub monthly: Option<Vec<Decimal>>,
}

impl BudgetPayload {
    fn into_input(self) -> Result<BudgetInput, Response> {
        match BudgetMode::parse(&self.mode) {
            Some(BudgetMode::Annual) => self.annual.map(BudgetInput::Annual).ok_or_else(|| {
                error_response(400, "VALIDATION_ERROR", "annual value required")
            }),
            Some(BudgetMode::Quarterly) => {
                let values: [Decimal; 4] = self
                    .quarterly
                    .unwrap_or_default()
                    .try_into()
                    .map_err(|_| {
                        error_response(400, "VALIDATION_ERROR", "exactly 4 quarterly values required")
                    })?;
                Ok(BudgetInput::Quarterly(values))
            }
            Some(BudgetMode::Monthly) => {
                let values: [Decimal; 12] = self
                    .monthly
                    .unwrap_or_default()
                    .try_into()
                    .map_err(|_| {
                        error_response(400, "VALIDATION_ERROR", "exactly 12 monthly values required")
                    })?;
                Ok(BudgetInput::Monthly(values))
            }
            None => Err(error_response(400, "VALIDATION_ERROR", "unknown budget mode")),
        }
    }
}

/// Request body for creating a company.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    /// Short code.
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    /// Legal name.
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    /// Optional initial budget.
    pub budget: Option<BudgetPayload>,
}

/// Request body for editing a company. Absent fields stay untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    /// New short code.
    pub name: Option<String>,
    /// New legal name.
    pub full_name: Option<String>,
    /// New comment.
    pub comment: Option<String>,
    /// New revenue figure.
    pub revenue: Option<Decimal>,
    /// As-of date for revenue.
    pub revenue_date: Option<String>,
    /// New expenses figure.
    pub expenses: Option<Decimal>,
    /// As-of date for expenses.
    pub expenses_date: Option<String>,
    /// Manual result override.
    pub result_ytd: Option<Decimal>,
    /// New liquidity figure.
    pub liquidity: Option<Decimal>,
    /// As-of date for liquidity.
    pub liquidity_date: Option<String>,
    /// New receivables figure.
    pub receivables: Option<Decimal>,
    /// As-of date for receivables.
    pub receivables_date: Option<String>,
    /// New accounts payable figure.
    pub accounts_payable: Option<Decimal>,
    /// As-of date for accounts payable.
    pub accounts_payable_date: Option<String>,
    /// New public fees figure.
    pub public_fees: Option<Decimal>,
    /// As-of date for public fees.
    pub public_fees_date: Option<String>,
    /// New salary expenses figure.
    pub salary_expenses: Option<Decimal>,
    /// As-of date for salary expenses.
    pub salary_expenses_date: Option<String>,
    /// Re-entered budget.
    pub budget: Option<BudgetPayload>,
    /// Externally-fed comparison liquidity.
    pub prev_liquidity: Option<Decimal>,
    /// Externally-fed comparison deviation.
    pub prev_deviation: Option<Decimal>,
    /// Replacement trend history.
    pub trend_history: Option<Vec<Decimal>>,
}

/// Request body for reordering the dashboard.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Company ids in their new display order.
    pub ordered_ids: Vec<i64>,
}

// ============================================================================
// Route Handlers
// ============================================================================

fn resolve_mode(state: &AppState, requested: Option<&str>) -> Result<DeviationMode, Response> {
    match requested {
        None => Ok(state.ctx.default_mode()),
        Some(raw) => DeviationMode::parse(raw).ok_or_else(|| {
            error_response(400, "VALIDATION_ERROR", "unknown deviation mode")
        }),
    }
}

/// GET `/companies` - the viewer's computed company rows.
async fn list_companies(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let mode = match resolve_mode(&state, query.mode.as_deref()) {
        Ok(mode) => mode,
        Err(response) => return response,
    };
    let today = Utc::now().date_naive();

    let rows = state.ctx.computed_visible(&user, today, mode).await;
    Json(rows).into_response()
}

/// POST `/companies` - create a company (controller only).
async fn create_company(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateCompanyRequest>,
) -> Response {
    if let Err(response) = require_controller(&user) {
        return response;
    }
    if let Err(err) = body.validate() {
        return error_response(400, "VALIDATION_ERROR", &err.to_string());
    }

    let budget = match body.budget.map(BudgetPayload::into_input).transpose() {
        Ok(budget) => budget,
        Err(response) => return response,
    };
    let draft = CompanyDraft {
        name: body.name,
        full_name: body.full_name,
        budget,
    };

    match state.ctx.companies().create(state.ctx.group_id(), draft).await {
        Ok(company) => {
            state.ctx.activity().record(
                user.full_name,
                "company_created",
                format!("company {} ({})", company.id, company.full_name),
            );
            refresh(&state).await;
            (StatusCode::CREATED, Json(company)).into_response()
        }
        Err(err) => app_error(&err),
    }
}

/// PATCH `/companies/{id}` - edit a company (controller only).
async fn update_company(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCompanyRequest>,
) -> Response {
    if let Err(response) = require_controller(&user) {
        return response;
    }

    let budget = match body.budget.map(BudgetPayload::into_input).transpose() {
        Ok(budget) => budget,
        Err(response) => return response,
    };
    let update = CompanyUpdate {
        name: body.name,
        full_name: body.full_name,
        comment: body.comment,
        revenue: body.revenue,
        revenue_date: body.revenue_date,
        expenses: body.expenses,
        expenses_date: body.expenses_date,
        result_ytd: body.result_ytd,
        liquidity: body.liquidity,
        liquidity_date: body.liquidity_date,
        receivables: body.receivables,
        receivables_date: body.receivables_date,
        accounts_payable: body.accounts_payable,
        accounts_payable_date: body.accounts_payable_date,
        public_fees: body.public_fees,
        public_fees_date: body.public_fees_date,
        salary_expenses: body.salary_expenses,
        salary_expenses_date: body.salary_expenses_date,
        budget,
        prev_liquidity: body.prev_liquidity,
        prev_deviation: body.prev_deviation,
        trend_history: body.trend_history,
    };

    match state.ctx.companies().update(CompanyId::new(id), update).await {
        Ok(company) => {
            state.ctx.activity().record(
                user.full_name,
                "company_updated",
                format!("company {id}"),
            );
            refresh(&state).await;
            Json(company).into_response()
        }
        Err(err) => app_error(&err),
    }
}

/// DELETE `/companies/{id}` - hard delete (controller only).
///
/// The storage layer rejects the delete while dependent reports exist;
/// that failure surfaces as the storage engine reported it.
async fn delete_company(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = require_controller(&user) {
        return response;
    }

    match state.ctx.companies().delete(CompanyId::new(id)).await {
        Ok(()) => {
            state.ctx.activity().record(
                user.full_name,
                "company_deleted",
                format!("company {id}"),
            );
            refresh(&state).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => app_error(&err),
    }
}

/// PUT `/companies/reorder` - persist a new display order (controller only).
async fn reorder_companies(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ReorderRequest>,
) -> Response {
    if let Err(response) = require_controller(&user) {
        return response;
    }

    let ordered: Vec<CompanyId> = body.ordered_ids.into_iter().map(CompanyId::new).collect();
    match state.ctx.companies().reorder(&ordered).await {
        Ok(()) => {
            refresh(&state).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => app_error(&err),
    }
}
