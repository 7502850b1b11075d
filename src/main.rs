//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve
    // iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Estoque da farmácia (farmacêutico)
    let inventory_routes = Router::new()
        .route(
            "/items",
            post(handlers::inventory::create_item).get(handlers::inventory::get_all_items),
        )
        .route(
            "/items/{id}",
            get(handlers::inventory::get_item)
                .put(handlers::inventory::update_item)
                .delete(handlers::inventory::delete_item),
        )
        .route(
            "/items/{id}/adjust-stock",
            post(handlers::inventory::adjust_stock),
        )
        .route("/low-stock", get(handlers::inventory::get_low_stock));

    // Ciclo de vida das solicitações (médico cria/cancela, farmacêutico
    // decide)
    let request_routes = Router::new()
        .route(
            "/",
            post(handlers::requests::create_request).get(handlers::requests::list_requests),
        )
        .route("/mine", get(handlers::requests::list_my_requests))
        .route("/{id}/approve", post(handlers::requests::approve_request))
        .route("/{id}/reject", post(handlers::requests::reject_request))
        .route("/{id}/cancel", post(handlers::requests::cancel_request));

    // Heurísticas de demanda/anomalia (farmacêutico consulta, admin treina)
    let analytics_routes = Router::new()
        .route("/predict-demand", get(handlers::analytics::predict_demand))
        .route("/optimal-reorder", get(handlers::analytics::optimal_reorder))
        .route("/detect-anomaly", post(handlers::analytics::detect_anomaly))
        .route("/train-models", post(handlers::analytics::train_models))
        .route("/anomalies", get(handlers::analytics::get_anomalies))
        .route(
            "/anomalies/{id}/resolve",
            post(handlers::analytics::resolve_anomaly),
        );

    let activity_routes = Router::new().route("/", get(handlers::activity::list_activity));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/inventory", inventory_routes)
        .nest("/api/requests", request_routes)
        .nest("/api/analytics", analytics_routes)
        .nest("/api/activity", activity_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
