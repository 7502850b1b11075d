// src/db/activity_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{common::error::AppError, models::activity::ActivityLog};

// Livro-razão de ações humanas. Só existem INSERT e SELECT aqui: uma linha
// escrita nunca é alterada.
#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: SqlitePool,
}

impl ActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        description: &str,
        status: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, description, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(description)
        .bind(status)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_all(&self) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT al.*, u.name AS user_name
            FROM activity_logs al
            LEFT JOIN users u ON al.user_id = u.id
            ORDER BY al.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
