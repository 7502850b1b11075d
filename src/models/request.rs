// src/models/request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// A máquina de estados da solicitação.
// APPROVED, REJECTED e CANCELLED são terminais; só PENDING transiciona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

// Itens controlados entram com prioridade alta na fila do farmacêutico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestPriority {
    Normal,
    High,
}

// Uma solicitação de medicamento feita por um médico para um paciente.
// As leituras sempre trazem `item_name` e `doctor_name` via JOIN, que é o
// que as telas consomem.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub item_id: Uuid,
    pub doctor_id: Uuid,
    pub quantity: i64,

    #[schema(example = "PAC-0042")]
    pub patient_id: String,

    #[schema(example = "João da Silva")]
    pub patient_name: String,

    pub notes: Option<String>,

    pub status: RequestStatus,
    pub priority: RequestPriority,

    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,

    // Campos de exibição (JOIN com inventory_items / users)
    pub item_name: Option<String>,
    pub doctor_name: Option<String>,
}
