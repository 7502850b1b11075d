// src/common/test_support.rs

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::AppState;
use crate::models::auth::Role;
use crate::models::request::{RequestPriority, RequestStatus};

/// Estado completo da aplicação sobre um SQLite em memória, com o mesmo
/// esquema de produção (as migrações de verdade, não um esquema paralelo).
pub(crate) async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        // Banco em memória: cada conexão é um banco; uma só, mantida viva.
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("falha ao abrir o banco em memória");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("falha ao rodar as migrações de teste");

    AppState::from_pool(pool)
}

pub(crate) async fn seed_user(pool: &SqlitePool, name: &str, role: Role) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO users (id, name, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(format!("{id}@hospital.test"))
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("falha ao inserir usuário de teste");
    id
}

pub(crate) async fn seed_item(
    pool: &SqlitePool,
    name: &str,
    stock: i64,
    min_stock: i64,
    controlled: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO inventory_items
            (id, name, category, stock, min_stock, expiry_date, price, controlled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind("Geral")
    .bind(stock)
    .bind(min_stock)
    .bind(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap())
    .bind("10.00")
    .bind(controlled)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("falha ao inserir item de teste");
    id
}

pub(crate) async fn seed_request(
    pool: &SqlitePool,
    doctor_id: Uuid,
    item_id: Uuid,
    quantity: i64,
    status: RequestStatus,
    priority: RequestPriority,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO requests
            (id, item_id, doctor_id, quantity, patient_id, patient_name, notes, status, priority, requested_at)
        VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(item_id)
    .bind(doctor_id)
    .bind(quantity)
    .bind("PAC-TEST")
    .bind("Paciente Teste")
    .bind(status)
    .bind(priority)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("falha ao inserir solicitação de teste");
    id
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn seed_training_point(
    pool: &SqlitePool,
    item_id: Uuid,
    quantity: i64,
    month: i64,
    day_of_week: i64,
    season: i64,
    source_date: NaiveDate,
) {
    sqlx::query(
        r#"
        INSERT INTO ml_training_data
            (id, item_id, quantity, month, day_of_week, season, category, source_date, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(item_id)
    .bind(quantity)
    .bind(month)
    .bind(day_of_week)
    .bind(season)
    .bind("Geral")
    .bind(source_date)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("falha ao inserir amostra de treino");
}
