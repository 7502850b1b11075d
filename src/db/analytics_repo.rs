// src/db/analytics_repo.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::analytics::{Anomaly, CachedPrediction, TrainingPoint},
};

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Dados de treino
    // ---

    /// Insere uma amostra derivada do histórico. O UNIQUE em
    /// (item_id, month, day_of_week, source_date) torna o re-treino
    /// idempotente: a mesma solicitação nunca vira duas amostras.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_training_point<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        quantity: i64,
        month: i64,
        day_of_week: i64,
        season: i64,
        category: &str,
        source_date: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO ml_training_data
                (id, item_id, quantity, month, day_of_week, season, category, source_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (item_id, month, day_of_week, source_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(item_id)
        .bind(quantity)
        .bind(month)
        .bind(day_of_week)
        .bind(season)
        .bind(category)
        .bind(source_date)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn training_data(&self, item_id: Uuid) -> Result<Vec<TrainingPoint>, AppError> {
        let points = sqlx::query_as::<_, TrainingPoint>(
            r#"
            SELECT item_id, quantity, month, day_of_week, season, category, source_date
            FROM ml_training_data
            WHERE item_id = ?
            ORDER BY created_at DESC
            LIMIT 500
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(points)
    }

    pub async fn training_count(&self, item_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ml_training_data WHERE item_id = ?")
                .bind(item_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // ---
    // Cache de previsões
    // ---
    // Read-through, chaveado por (item, data alvo). Previsões velhas são
    // aceitáveis; a invalidação acontece sozinha quando a data alvo rola.

    pub async fn cached_prediction(
        &self,
        item_id: Uuid,
        predicted_date: NaiveDate,
    ) -> Result<Option<CachedPrediction>, AppError> {
        let cached = sqlx::query_as::<_, CachedPrediction>(
            r#"
            SELECT predicted_demand, confidence
            FROM ml_predictions
            WHERE item_id = ? AND predicted_date = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(predicted_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cached)
    }

    // UPSERT: se já existe previsão para (item, data), substitui.
    pub async fn cache_prediction<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        predicted_date: NaiveDate,
        predicted_demand: i64,
        confidence: f64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO ml_predictions (id, item_id, predicted_date, predicted_demand, confidence, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (item_id, predicted_date) DO UPDATE SET
                predicted_demand = excluded.predicted_demand,
                confidence = excluded.confidence,
                created_at = excluded.created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(item_id)
        .bind(predicted_date)
        .bind(predicted_demand)
        .bind(confidence)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    // ---
    // Achados de anomalia
    // ---

    pub async fn insert_anomaly<'e, E>(
        &self,
        executor: E,
        request_id: Option<Uuid>,
        item_id: Uuid,
        anomaly_type: &str,
        anomaly_score: f64,
        description: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO ml_anomalies (id, request_id, item_id, anomaly_type, anomaly_score, description, resolved, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request_id)
        .bind(item_id)
        .bind(anomaly_type)
        .bind(anomaly_score)
        .bind(description)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_anomalies(&self, resolved: bool) -> Result<Vec<Anomaly>, AppError> {
        let anomalies = sqlx::query_as::<_, Anomaly>(
            r#"
            SELECT a.*, i.name AS item_name, r.patient_name AS patient_name
            FROM ml_anomalies a
            LEFT JOIN inventory_items i ON a.item_id = i.id
            LEFT JOIN requests r ON a.request_id = r.id
            WHERE a.resolved = ?
            ORDER BY a.created_at DESC
            LIMIT 50
            "#,
        )
        .bind(resolved)
        .fetch_all(&self.pool)
        .await?;
        Ok(anomalies)
    }

    pub async fn resolve_anomaly<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE ml_anomalies SET resolved = 1 WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::AnomalyNotFound);
        }
        Ok(())
    }
}
