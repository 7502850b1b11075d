// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Uma linha do log de atividades: quem fez, o que fez, com que resultado.
// Escrita uma única vez por transição de ciclo de vida, nunca alterada.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "Aprovou solicitação de Amoxicilina 500mg (Quantidade: 20) - Estoque reduzido")]
    pub description: String,

    #[schema(example = "APPROVED")]
    pub status: String,

    pub created_at: DateTime<Utc>,

    // Nome do usuário via JOIN (o log guarda só o id)
    pub user_name: Option<String>,
}
