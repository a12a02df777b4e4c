//! User directory routes.
//!
//! Every mutation that can change leader-to-company assignments finishes
//! by re-syncing the affected companies' manager strings.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

use konsern_core::access::{UserDraft, UserUpdate};
use konsern_shared::types::{CompanyId, UserId, UserRole};

use crate::{AppState, middleware::AuthUser};

use super::{app_error, error_response, refresh, require_controller};

/// Creates the user routes (auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{id}", patch(update_user))
        .route("/users/{id}", delete(delete_user))
}

/// Request body for creating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    /// Contact address.
    #[validate(email)]
    pub email: String,
    /// Role: controller or leader.
    pub role: String,
    /// Initial grant set.
    #[serde(default)]
    pub company_access: Vec<i64>,
}

/// Request body for editing a user.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name.
    pub full_name: Option<String>,
    /// New contact address.
    pub email: Option<String>,
    /// New role.
    pub role: Option<String>,
    /// Replacement grant set; absent leaves grants alone.
    pub company_access: Option<Vec<i64>>,
}

async fn sync_managers(state: &AppState, affected: &[CompanyId]) {
    if affected.is_empty() {
        return;
    }
    if let Err(err) = state
        .ctx
        .access()
        .sync_manager_names(state.ctx.group_id(), affected)
        .await
    {
        warn!(error = %err, "manager sync after user mutation failed");
    }
}

/// GET `/users` - the group's users (controller only).
async fn list_users(State(state): State<AppState>, AuthUser(user): AuthUser) -> Response {
    if let Err(response) = require_controller(&user) {
        return response;
    }
    match state.ctx.access().load_users(state.ctx.group_id()).await {
        Ok(users) => Json(users).into_response(),
        Err(err) => app_error(&err),
    }
}

/// POST `/users` - create a user (controller only).
async fn create_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateUserRequest>,
) -> Response {
    if let Err(response) = require_controller(&actor) {
        return response;
    }
    if let Err(err) = body.validate() {
        return error_response(400, "VALIDATION_ERROR", &err.to_string());
    }
    let Some(role) = UserRole::parse(&body.role) else {
        return error_response(400, "VALIDATION_ERROR", "unknown role");
    };

    let draft = UserDraft {
        full_name: body.full_name,
        email: body.email,
        role,
        company_access: body.company_access.into_iter().map(CompanyId::new).collect(),
    };

    match state.ctx.access().create_user(state.ctx.group_id(), draft).await {
        Ok((user, affected)) => {
            sync_managers(&state, &affected).await;
            refresh(&state).await;
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(err) => app_error(&err),
    }
}

/// PATCH `/users/{id}` - edit a user (controller only).
async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Response {
    if let Err(response) = require_controller(&actor) {
        return response;
    }
    let role = match body.role.as_deref().map(UserRole::parse) {
        Some(None) => return error_response(400, "VALIDATION_ERROR", "unknown role"),
        Some(Some(role)) => Some(role),
        None => None,
    };

    let update = UserUpdate {
        full_name: body.full_name,
        email: body.email,
        role,
        company_access: body
            .company_access
            .map(|ids| ids.into_iter().map(CompanyId::new).collect()),
    };

    match state.ctx.access().update_user(UserId::new(id), update).await {
        Ok(affected) => {
            sync_managers(&state, &affected).await;
            refresh(&state).await;
            match state
                .ctx
                .access()
                .find_user(state.ctx.group_id(), UserId::new(id))
                .await
            {
                Ok(user) => Json(user).into_response(),
                Err(err) => app_error(&err),
            }
        }
        Err(err) => app_error(&err),
    }
}

/// DELETE `/users/{id}` - delete a user (controller only).
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = require_controller(&actor) {
        return response;
    }

    match state
        .ctx
        .access()
        .delete_user(state.ctx.group_id(), UserId::new(id))
        .await
    {
        Ok(affected) => {
            sync_managers(&state, &affected).await;
            refresh(&state).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => app_error(&err),
    }
}
