// src/middleware/auth.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Role};

// A autenticação mora no gateway do hospital, que injeta a identidade já
// autorizada em dois cabeçalhos. Este serviço confia neles; o que resta
// decidir aqui é só o que cada papel pode fazer (ver rbac.rs).
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

// Extrator para obter o usuário corrente diretamente nos handlers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or(AppError::MissingIdentity)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Role>().ok())
            .ok_or(AppError::MissingIdentity)?;

        Ok(CurrentUser { id, role })
    }
}
