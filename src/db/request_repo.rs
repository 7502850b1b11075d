// src/db/request_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::analytics::{HistoricalRequest, TrainingSource},
    models::request::{Request, RequestPriority, RequestStatus},
};

// Toda leitura de solicitação sai com os nomes que as telas exibem.
const BASE_SELECT: &str = r#"
    SELECT r.*, i.name AS item_name, u.name AS doctor_name
    FROM requests r
    LEFT JOIN inventory_items i ON r.item_id = i.id
    LEFT JOIN users u ON r.doctor_id = u.id
"#;

#[derive(Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_all(&self) -> Result<Vec<Request>, AppError> {
        let sql = format!("{BASE_SELECT} ORDER BY r.requested_at DESC");
        let requests = sqlx::query_as::<_, Request>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Request>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{BASE_SELECT} WHERE r.id = ?");
        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(request)
    }

    pub async fn get_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Request>, AppError> {
        let sql = format!("{BASE_SELECT} WHERE r.doctor_id = ? ORDER BY r.requested_at DESC");
        let requests = sqlx::query_as::<_, Request>(&sql)
            .bind(doctor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    pub async fn get_by_status(&self, status: RequestStatus) -> Result<Vec<Request>, AppError> {
        let sql = format!("{BASE_SELECT} WHERE r.status = ? ORDER BY r.requested_at DESC");
        let requests = sqlx::query_as::<_, Request>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    /// Busca livre da tela do farmacêutico: paciente, prontuário ou nome do
    /// item.
    pub async fn search(&self, term: &str) -> Result<Vec<Request>, AppError> {
        let pattern = format!("%{term}%");
        let sql = format!(
            "{BASE_SELECT} WHERE r.patient_name LIKE ? OR r.patient_id LIKE ? OR i.name LIKE ? ORDER BY r.requested_at DESC"
        );
        let requests = sqlx::query_as::<_, Request>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        doctor_id: Uuid,
        item_id: Uuid,
        quantity: i64,
        patient_id: &str,
        patient_name: &str,
        notes: Option<&str>,
        status: RequestStatus,
        priority: RequestPriority,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO requests
                (id, item_id, doctor_id, quantity, patient_id, patient_name, notes, status, priority, requested_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(item_id)
        .bind(doctor_id)
        .bind(quantity)
        .bind(patient_id)
        .bind(patient_name)
        .bind(notes)
        .bind(status)
        .bind(priority)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(id)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE requests SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::RequestNotFound);
        }
        Ok(())
    }

    /// Transição para APPROVED com o carimbo de quem aprovou e quando.
    pub async fn set_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approved_by: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE requests SET status = ?, approved_at = ?, approved_by = ? WHERE id = ?",
        )
        .bind(RequestStatus::Approved)
        .bind(Utc::now())
        .bind(approved_by)
        .bind(id)
        .execute(executor)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::RequestNotFound);
        }
        Ok(())
    }

    // ---
    // Amostras para as heurísticas
    // ---

    /// Histórico de quantidades do item (mais recentes primeiro), excluindo
    /// opcionalmente a solicitação sob avaliação.
    pub async fn historical_quantities(
        &self,
        item_id: Uuid,
        exclude_request_id: Option<Uuid>,
    ) -> Result<Vec<HistoricalRequest>, AppError> {
        let history = match exclude_request_id {
            Some(exclude) => {
                sqlx::query_as::<_, HistoricalRequest>(
                    "SELECT quantity, doctor_id FROM requests WHERE item_id = ? AND id != ? ORDER BY requested_at DESC LIMIT 100",
                )
                .bind(item_id)
                .bind(exclude)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, HistoricalRequest>(
                    "SELECT quantity, doctor_id FROM requests WHERE item_id = ? ORDER BY requested_at DESC LIMIT 100",
                )
                .bind(item_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(history)
    }

    pub async fn count_by_doctor_item(
        &self,
        doctor_id: Uuid,
        item_id: Uuid,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM requests WHERE doctor_id = ? AND item_id = ?",
        )
        .bind(doctor_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn list_for_training(&self, item_id: Uuid) -> Result<Vec<TrainingSource>, AppError> {
        let sources = sqlx::query_as::<_, TrainingSource>(
            "SELECT quantity, requested_at FROM requests WHERE item_id = ? ORDER BY requested_at DESC LIMIT 1000",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sources)
    }
}
