// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Os três papéis do hospital. O gateway na frente já autenticou o usuário;
// aqui o papel só decide o que cada rota permite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Doctor,
    Pharmacist,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DOCTOR" => Ok(Role::Doctor),
            "PHARMACIST" => Ok(Role::Pharmacist),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

// Representa um usuário vindo do banco de dados. O cadastro em si é feito
// por outro sistema; este serviço só lê a tabela (nome do aprovador, joins).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Dra. Helena Costa")]
    pub name: String,

    pub email: String,
    pub role: Role,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
