// src/config.rs

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::{env, time::Duration};

use crate::db::{
    ActivityLogRepository, AnalyticsRepository, InventoryRepository, RequestRepository,
    UserRepository,
};
use crate::services::{ActivityService, AnalyticsService, InventoryService, RequestService};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub inventory_service: InventoryService,
    pub request_service: RequestService,
    pub analytics_service: AnalyticsService,
    pub activity_service: ActivityService,
}

impl AppState {
    // Carrega as configurações do ambiente e cria o AppState.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // SQLite embarcado; `mode=rwc` cria o arquivo na primeira subida.
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://pharmacy.db?mode=rwc".to_string());

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool))
    }

    // --- Monta o gráfico de dependências ---
    // Repositórios e serviços são construídos UMA vez aqui e injetados nos
    // handlers via `with_state`; nenhum componente busca dependência em
    // estado global.
    pub fn from_pool(db_pool: SqlitePool) -> Self {
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let request_repo = RequestRepository::new(db_pool.clone());
        let activity_repo = ActivityLogRepository::new(db_pool.clone());
        let analytics_repo = AnalyticsRepository::new(db_pool.clone());
        let user_repo = UserRepository::new(db_pool.clone());

        let activity_service = ActivityService::new(activity_repo, db_pool.clone());
        let analytics_service = AnalyticsService::new(
            analytics_repo,
            inventory_repo.clone(),
            request_repo.clone(),
            db_pool.clone(),
        );
        let inventory_service = InventoryService::new(
            inventory_repo.clone(),
            activity_service.clone(),
            db_pool.clone(),
        );
        let request_service = RequestService::new(
            request_repo,
            inventory_repo,
            user_repo,
            activity_service.clone(),
            analytics_service.clone(),
            db_pool.clone(),
        );

        Self {
            db_pool,
            inventory_service,
            request_service,
            analytics_service,
            activity_service,
        }
    }
}
