//! Report ledger routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use konsern_core::reports::{ReportEdit, ReportError, ReportFields, ReportSource, ReportSubmission};
use konsern_shared::types::{CompanyId, ReportId};

use crate::{AppState, middleware::AuthUser};

use super::{error_response, refresh, report_error, require_company_access};

/// Creates the report routes (auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/reports", get(list_reports))
        .route("/companies/{company_id}/reports", post(submit_report))
        .route("/reports/{id}", patch(edit_report))
        .route("/reports/{id}", delete(delete_report))
        .route("/reports/{id}/approve", post(approve_report))
        .route("/reports/{id}/unlock", post(unlock_report))
}

// ============================================================================
// Request Types
// ============================================================================

/// The optional financial fields of a submission or edit.
#[derive(Debug, Default, Deserialize)]
pub struct ReportFieldsPayload {
    /// Revenue, year to date.
    pub revenue: Option<Decimal>,
    /// As-of date for revenue.
    pub revenue_date: Option<String>,
    /// Expenses, year to date.
    pub expenses: Option<Decimal>,
    /// As-of date for expenses.
    pub expenses_date: Option<String>,
    /// Bank liquidity.
    pub liquidity: Option<Decimal>,
    /// As-of date for liquidity.
    pub liquidity_date: Option<String>,
    /// Outstanding receivables.
    pub receivables: Option<Decimal>,
    /// As-of date for receivables.
    pub receivables_date: Option<String>,
    /// Accounts payable.
    pub accounts_payable: Option<Decimal>,
    /// As-of date for accounts payable.
    pub accounts_payable_date: Option<String>,
    /// Public fees due.
    pub public_fees: Option<Decimal>,
    /// As-of date for public fees.
    pub public_fees_date: Option<String>,
    /// Salary expenses.
    pub salary_expenses: Option<Decimal>,
    /// As-of date for salary expenses.
    pub salary_expenses_date: Option<String>,
}

impl ReportFieldsPayload {
    fn into_fields(self) -> ReportFields {
        // `result` is never taken from the caller; the ledger derives it.
        ReportFields {
            revenue: self.revenue,
            revenue_date: self.revenue_date,
            expenses: self.expenses,
            expenses_date: self.expenses_date,
            result: None,
            liquidity: self.liquidity,
            liquidity_date: self.liquidity_date,
            receivables: self.receivables,
            receivables_date: self.receivables_date,
            accounts_payable: self.accounts_payable,
            accounts_payable_date: self.accounts_payable_date,
            public_fees: self.public_fees,
            public_fees_date: self.public_fees_date,
            salary_expenses: self.salary_expenses,
            salary_expenses_date: self.salary_expenses_date,
        }
    }
}

/// Request body for submitting a report.
#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    /// Submission date; defaults to today.
    pub date: Option<NaiveDate>,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Figure source; defaults to `Manuell`.
    pub source: Option<String>,
    /// The supplied financial subset.
    #[serde(flatten)]
    pub fields: ReportFieldsPayload,
}

/// Request body for editing an unapproved report.
#[derive(Debug, Deserialize)]
pub struct EditReportRequest {
    /// Replacement submission date.
    pub date: Option<NaiveDate>,
    /// Replacement comment.
    pub comment: Option<String>,
    /// Replacement source.
    pub source: Option<String>,
    /// Field updates, same partial semantics as submission.
    #[serde(flatten)]
    pub fields: ReportFieldsPayload,
}

fn parse_source(raw: Option<&str>) -> Result<Option<ReportSource>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => ReportSource::parse(raw).map(Some).ok_or_else(|| {
            error_response(400, "VALIDATION_ERROR", "unknown report source")
        }),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/companies/{company_id}/reports` - the company's report log.
async fn list_reports(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(company_id): Path<i64>,
) -> Response {
    let company_id = CompanyId::new(company_id);
    if let Err(response) = require_company_access(&user, company_id) {
        return response;
    }

    match state.ctx.reports().list(company_id).await {
        Ok(reports) => Json(reports).into_response(),
        Err(err) => report_error(&err),
    }
}

/// POST `/companies/{company_id}/reports` - submit a report.
async fn submit_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(company_id): Path<i64>,
    Json(body): Json<SubmitReportRequest>,
) -> Response {
    let company_id = CompanyId::new(company_id);
    if let Err(response) = require_company_access(&user, company_id) {
        return response;
    }

    let source = match parse_source(body.source.as_deref()) {
        Ok(source) => source.unwrap_or(ReportSource::Manuell),
        Err(response) => return response,
    };
    let submission = ReportSubmission {
        date: body.date.unwrap_or_else(|| Utc::now().date_naive()),
        comment: body.comment,
        source,
        fields: body.fields.into_fields(),
    };

    match state.ctx.reports().submit(company_id, submission, &user).await {
        Ok(report) => {
            refresh(&state).await;
            (StatusCode::CREATED, Json(report)).into_response()
        }
        Err(err) => report_error(&err),
    }
}

/// PATCH `/reports/{id}` - edit an unapproved report.
async fn edit_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<EditReportRequest>,
) -> Response {
    let id = ReportId::new(id);
    let report = match state.ctx.reports().find(id).await {
        Ok(Some(report)) => report,
        Ok(None) => return report_error(&ReportError::NotFound(id)),
        Err(err) => return report_error(&err),
    };
    if let Err(response) = require_company_access(&user, report.company_id) {
        return response;
    }

    let source = match parse_source(body.source.as_deref()) {
        Ok(source) => source,
        Err(response) => return response,
    };
    let edit = ReportEdit {
        comment: body.comment,
        date: body.date,
        source,
        fields: body.fields.into_fields(),
    };

    match state.ctx.reports().edit(id, edit, &user).await {
        Ok(report) => {
            refresh(&state).await;
            Json(report).into_response()
        }
        Err(err) => report_error(&err),
    }
}

/// POST `/reports/{id}/approve` - approve (controller only).
///
/// A missing report is a no-op by design; the response says which case
/// happened.
async fn approve_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Response {
    match state.ctx.reports().approve(ReportId::new(id), &user).await {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => report_error(&err),
    }
}

/// POST `/reports/{id}/unlock` - back to submitted (controller only).
async fn unlock_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Response {
    match state.ctx.reports().unlock(ReportId::new(id), &user).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => report_error(&err),
    }
}

/// DELETE `/reports/{id}` - delete an unapproved report.
async fn delete_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Response {
    let id = ReportId::new(id);
    let report = match state.ctx.reports().find(id).await {
        Ok(Some(report)) => report,
        Ok(None) => return report_error(&ReportError::NotFound(id)),
        Err(err) => return report_error(&err),
    };
    if let Err(response) = require_company_access(&user, report.company_id) {
        return response;
    }

    match state.ctx.reports().delete(id, &user).await {
        Ok(()) => {
            refresh(&state).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => report_error(&err),
    }
}
