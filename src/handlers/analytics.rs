// src/handlers/analytics.rs

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
    models::analytics::{Anomaly, AnomalyReport, PredictDemandResponse, ReorderRecommendation, TrainModelsResponse},
};

// ---
// GET /api/analytics/predict-demand?itemId=...&days=30
// ---
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictDemandParams {
    pub item_id: Uuid,
    pub days: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/analytics/predict-demand",
    tag = "Analytics",
    responses(
        (status = 200, description = "Previsão de demanda do item", body = PredictDemandResponse),
        (status = 404, description = "Item não encontrado")
    ),
    params(
        ("itemId" = Uuid, Query, description = "ID do item"),
        ("days" = Option<i64>, Query, description = "Horizonte em dias (padrão 30)")
    )
)]
pub async fn predict_demand(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PredictDemandParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::AnalyticsRead)?;

    let item = app_state.inventory_service.find_item(params.item_id).await?;
    let prediction = app_state
        .analytics_service
        .predict_demand(params.item_id, params.days.unwrap_or(30))
        .await?;

    Ok((
        StatusCode::OK,
        Json(PredictDemandResponse {
            item_id: item.id,
            item_name: item.name,
            prediction,
            current_stock: item.stock,
            min_stock: item.min_stock,
        }),
    ))
}

// ---
// GET /api/analytics/optimal-reorder?itemId=...
// ---
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalReorderParams {
    pub item_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/analytics/optimal-reorder",
    tag = "Analytics",
    responses(
        (status = 200, description = "Recomendação de reposição", body = ReorderRecommendation),
        (status = 404, description = "Item não encontrado")
    ),
    params(("itemId" = Uuid, Query, description = "ID do item"))
)]
pub async fn optimal_reorder(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<OptimalReorderParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::AnalyticsRead)?;
    let recommendation = app_state
        .analytics_service
        .optimal_reorder(params.item_id)
        .await?;
    Ok((StatusCode::OK, Json(recommendation)))
}

// ---
// POST /api/analytics/detect-anomaly
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectAnomalyPayload {
    pub item_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i64,

    pub doctor_id: Uuid,

    // Se a solicitação já existe, fica de fora da própria amostra.
    pub request_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/analytics/detect-anomaly",
    tag = "Analytics",
    request_body = DetectAnomalyPayload,
    responses((status = 200, description = "Avaliação de anomalia", body = AnomalyReport))
)]
pub async fn detect_anomaly(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<DetectAnomalyPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::AnomalyManage)?;
    payload.validate()?;

    let report = app_state
        .analytics_service
        .detect_anomaly(
            payload.item_id,
            payload.quantity,
            payload.doctor_id,
            payload.request_id,
        )
        .await?;

    // Achado confirmado vai para a fila de revisão do admin.
    if report.is_anomaly {
        app_state
            .analytics_service
            .record_finding(payload.request_id, payload.item_id, &report)
            .await?;
    }

    Ok((StatusCode::OK, Json(report)))
}

// ---
// POST /api/analytics/train-models
// ---
#[utoipa::path(
    post,
    path = "/api/analytics/train-models",
    tag = "Analytics",
    responses((status = 200, description = "Resultado do treino por item", body = TrainModelsResponse))
)]
pub async fn train_models(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::AnalyticsTrain)?;
    let response = app_state.analytics_service.train_models().await?;
    Ok((StatusCode::OK, Json(response)))
}

// ---
// GET /api/analytics/anomalies?resolved=false
// ---
#[derive(Debug, Deserialize)]
pub struct AnomaliesParams {
    pub resolved: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/analytics/anomalies",
    tag = "Analytics",
    responses((status = 200, description = "Achados de anomalia", body = [Anomaly])),
    params(("resolved" = Option<bool>, Query, description = "Filtra resolvidas (padrão: false)"))
)]
pub async fn get_anomalies(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<AnomaliesParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::AnomalyManage)?;
    let anomalies = app_state
        .analytics_service
        .list_anomalies(params.resolved.unwrap_or(false))
        .await?;
    Ok((StatusCode::OK, Json(anomalies)))
}

// POST /api/analytics/anomalies/{id}/resolve
#[utoipa::path(
    post,
    path = "/api/analytics/anomalies/{id}/resolve",
    tag = "Analytics",
    responses(
        (status = 200, description = "Anomalia marcada como resolvida"),
        (status = 404, description = "Anomalia não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da anomalia"))
)]
pub async fn resolve_anomaly(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::AnomalyManage)?;
    app_state.analytics_service.resolve_anomaly(id).await?;
    Ok(StatusCode::OK)
}
