// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::CurrentUser, rbac::Permission},
    models::inventory::{Item, StockAdjustment},
};

// ---
// Validação customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub stock: i64,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default)]
    pub min_stock: i64,

    pub expiry_date: NaiveDate, // Formato YYYY-MM-DD

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[serde(default)]
    pub controlled: bool,
}

// POST /api/inventory/items
#[utoipa::path(
    post,
    path = "/api/inventory/items",
    tag = "Inventory",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item criado", body = Item),
        (status = 400, description = "Payload inválido")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "ID do usuário autenticado"),
        ("x-user-role" = String, Header, description = "Papel do usuário")
    )
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryWrite)?;
    payload.validate()?;

    let item = app_state
        .inventory_service
        .create_item(
            user.id,
            &payload.name,
            &payload.category,
            payload.stock,
            payload.min_stock,
            payload.expiry_date,
            payload.price,
            payload.controlled,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/inventory/items
#[utoipa::path(
    get,
    path = "/api/inventory/items",
    tag = "Inventory",
    responses((status = 200, description = "Todos os itens", body = [Item]))
)]
pub async fn get_all_items(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryRead)?;
    let items = app_state.inventory_service.get_all_items().await?;
    Ok((StatusCode::OK, Json(items)))
}

// GET /api/inventory/items/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    responses(
        (status = 200, description = "Item", body = Item),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do item"))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryRead)?;
    let item = app_state.inventory_service.find_item(id).await?;
    Ok((StatusCode::OK, Json(item)))
}

// ---
// Payload: UpdateItem (sem `stock`: saldo só muda via ajuste)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub min_stock: i64,

    pub expiry_date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[serde(default)]
    pub controlled: bool,
}

// PUT /api/inventory/items/{id}
#[utoipa::path(
    put,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = Item),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do item"))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryWrite)?;
    payload.validate()?;

    let item = app_state
        .inventory_service
        .update_item(
            user.id,
            id,
            &payload.name,
            &payload.category,
            payload.min_stock,
            payload.expiry_date,
            payload.price,
            payload.controlled,
        )
        .await?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/inventory/items/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/items/{id}",
    tag = "Inventory",
    responses(
        (status = 204, description = "Item removido"),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do item"))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryWrite)?;
    app_state.inventory_service.delete_item(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: Ajuste de estoque
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub amount: i64,

    pub mode: StockAdjustment, // "add" | "subtract" | "set"

    pub reason: Option<String>,
}

// POST /api/inventory/items/{id}/adjust-stock
#[utoipa::path(
    post,
    path = "/api/inventory/items/{id}/adjust-stock",
    tag = "Inventory",
    request_body = AdjustStockPayload,
    responses(
        (status = 200, description = "Saldo atualizado", body = Item),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do item"))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryWrite)?;
    payload.validate()?;

    // Retorna o novo saldo para o frontend atualizar a tela.
    let item = app_state
        .inventory_service
        .adjust_stock(
            user.id,
            id,
            payload.amount,
            payload.mode,
            payload.reason.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(item)))
}

// GET /api/inventory/low-stock
#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    tag = "Inventory",
    responses((status = 200, description = "Itens no limiar de reposição", body = [Item]))
)]
pub async fn get_low_stock(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Permission::InventoryRead)?;
    let items = app_state.inventory_service.get_low_stock().await?;
    Ok((StatusCode::OK, Json(items)))
}
