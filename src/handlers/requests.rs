// src/handlers/requests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::CurrentUser, rbac::Permission},
    models::request::{Request, RequestStatus},
};

// ---
// Payload: criação de solicitação (médico)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    pub item_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i64,

    #[validate(length(min = 1, message = "O identificador do paciente é obrigatório."))]
    pub patient_id: String,

    #[validate(length(min = 1, message = "O nome do paciente é obrigatório."))]
    pub patient_name: String,

    pub notes: Option<String>,
}

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Solicitação criada (PENDING se controlado, APPROVED caso contrário)", body = Request),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Estoque insuficiente")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "ID do médico autenticado"),
        ("x-user-role" = String, Header, description = "Papel do usuário")
    )
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::RequestCreate)?;
    payload.validate()?;

    let request = app_state
        .request_service
        .create_request(
            user.id,
            payload.item_id,
            payload.quantity,
            &payload.patient_id,
            &payload.patient_name,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

// ---
// Listagem (farmacêutico/admin), com filtro de status e busca livre
// ---
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsParams {
    pub status: Option<RequestStatus>,
    pub search: Option<String>,
}

// GET /api/requests
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    responses((status = 200, description = "Solicitações", body = [Request])),
    params(
        ("status" = Option<String>, Query, description = "Filtra por status (PENDING, APPROVED, REJECTED, CANCELLED)"),
        ("search" = Option<String>, Query, description = "Busca por paciente, prontuário ou item")
    )
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListRequestsParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::RequestRead)?;
    let requests = app_state
        .request_service
        .list(params.status, params.search.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(requests)))
}

// GET /api/requests/mine — histórico do médico logado
#[utoipa::path(
    get,
    path = "/api/requests/mine",
    tag = "Requests",
    responses((status = 200, description = "Histórico do médico", body = [Request]))
)]
pub async fn list_my_requests(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::RequestReadOwn)?;
    let requests = app_state.request_service.history_for_doctor(user.id).await?;
    Ok((StatusCode::OK, Json(requests)))
}

// POST /api/requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/requests/{id}/approve",
    tag = "Requests",
    responses(
        (status = 200, description = "Aprovada (idempotente se já aprovada)", body = Request),
        (status = 409, description = "Transição inválida ou estoque insuficiente")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação"))
)]
pub async fn approve_request(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::RequestApprove)?;
    let request = app_state.request_service.approve(id, user.id).await?;
    Ok((StatusCode::OK, Json(request)))
}

// POST /api/requests/{id}/reject
#[utoipa::path(
    post,
    path = "/api/requests/{id}/reject",
    tag = "Requests",
    responses(
        (status = 200, description = "Rejeitada", body = Request),
        (status = 409, description = "Apenas pendentes podem ser rejeitadas")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação"))
)]
pub async fn reject_request(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::RequestApprove)?;
    let request = app_state.request_service.reject(id, user.id).await?;
    Ok((StatusCode::OK, Json(request)))
}

// POST /api/requests/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/requests/{id}/cancel",
    tag = "Requests",
    responses(
        (status = 200, description = "Cancelada (idempotente)", body = Request),
        (status = 409, description = "Apenas pendentes podem ser canceladas")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação"))
)]
pub async fn cancel_request(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::RequestCancel)?;
    let request = app_state
        .request_service
        .cancel(id, user.id, user.role)
        .await?;
    Ok((StatusCode::OK, Json(request)))
}
