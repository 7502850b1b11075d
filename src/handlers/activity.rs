// src/handlers/activity.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::CurrentUser, rbac::Permission},
    models::activity::ActivityLog,
};

// GET /api/activity
#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "Activity",
    responses((status = 200, description = "Log de atividades (mais recentes primeiro)", body = [ActivityLog]))
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::ActivityRead)?;
    let logs = app_state.activity_service.list().await?;
    Ok((StatusCode::OK, Json(logs)))
}
