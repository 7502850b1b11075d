// src/services/activity_service.rs

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError, db::ActivityLogRepository, models::activity::ActivityLog,
};

// O Registrador de Atividades. As transições de ciclo de vida chamam
// `record` de forma síncrona depois do commit; o contrato é fire-and-forget:
// uma falha de escrita aqui é logada e NUNCA desfaz a transição que a gerou.
#[derive(Clone)]
pub struct ActivityService {
    repo: ActivityLogRepository,
    pool: SqlitePool,
}

impl ActivityService {
    pub fn new(repo: ActivityLogRepository, pool: SqlitePool) -> Self {
        Self { repo, pool }
    }

    pub async fn record(&self, user_id: Uuid, description: &str, status: &str) {
        if let Err(e) = self.repo.create(&self.pool, user_id, description, status).await {
            tracing::warn!("Falha ao registrar atividade ('{}'): {}", description, e);
        }
    }

    pub async fn list(&self) -> Result<Vec<ActivityLog>, AppError> {
        self.repo.get_all().await
    }
}
