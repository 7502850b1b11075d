// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- INVENTORY ---
        handlers::inventory::create_item,
        handlers::inventory::get_all_items,
        handlers::inventory::get_item,
        handlers::inventory::update_item,
        handlers::inventory::delete_item,
        handlers::inventory::adjust_stock,
        handlers::inventory::get_low_stock,

        // --- REQUESTS ---
        handlers::requests::create_request,
        handlers::requests::list_requests,
        handlers::requests::list_my_requests,
        handlers::requests::approve_request,
        handlers::requests::reject_request,
        handlers::requests::cancel_request,

        // --- ANALYTICS ---
        handlers::analytics::predict_demand,
        handlers::analytics::optimal_reorder,
        handlers::analytics::detect_anomaly,
        handlers::analytics::train_models,
        handlers::analytics::get_anomalies,
        handlers::analytics::resolve_anomaly,

        // --- ACTIVITY ---
        handlers::activity::list_activity,
    ),
    components(
        schemas(
            // --- Inventory ---
            models::inventory::Item,
            models::inventory::StockAdjustment,
            handlers::inventory::CreateItemPayload,
            handlers::inventory::UpdateItemPayload,
            handlers::inventory::AdjustStockPayload,

            // --- Requests ---
            models::request::Request,
            models::request::RequestStatus,
            models::request::RequestPriority,
            handlers::requests::CreateRequestPayload,

            // --- Analytics ---
            models::analytics::DemandPrediction,
            models::analytics::PredictDemandResponse,
            models::analytics::ReorderRecommendation,
            models::analytics::AnomalyReport,
            models::analytics::Anomaly,
            models::analytics::TrainedItemReport,
            models::analytics::TrainModelsResponse,
            handlers::analytics::DetectAnomalyPayload,

            // --- Activity / Usuários ---
            models::activity::ActivityLog,
            models::auth::User,
            models::auth::Role,
        )
    ),
    tags(
        (name = "Inventory", description = "Gestão de Estoque da Farmácia"),
        (name = "Requests", description = "Ciclo de Vida das Solicitações de Medicamentos"),
        (name = "Analytics", description = "Previsão de Demanda e Detecção de Anomalias"),
        (name = "Activity", description = "Log de Atividades")
    )
)]
pub struct ApiDoc;
