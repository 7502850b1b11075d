use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::request::RequestStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Todas as variantes de negócio são recuperáveis: o engine devolve o erro
// tipado e a camada HTTP decide a mensagem; nada aqui derruba o processo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Identidade ausente ou inválida")]
    MissingIdentity,

    #[error("Permissão '{0}' necessária")]
    AccessDenied(&'static str),

    #[error("Item não encontrado")]
    ItemNotFound,

    #[error("Solicitação não encontrada")]
    RequestNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Anomalia não encontrada")]
    AnomalyNotFound,

    #[error("A quantidade deve ser maior que zero")]
    InvalidQuantity,

    #[error("O campo '{0}' é obrigatório")]
    MissingField(&'static str),

    #[error("Estoque insuficiente. Disponível: {available}, Solicitado: {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Transição de status inválida (status atual: {current})")]
    InvalidTransition { current: RequestStatus },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // O chamador precisa dos números para montar a mensagem na tela.
            AppError::InsufficientStock { available, requested } => {
                let body = Json(json!({
                    "error": format!(
                        "Estoque insuficiente. Disponível: {}, Solicitado: {}",
                        available, requested
                    ),
                    "available": available,
                    "requested": requested,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::InvalidTransition { current } => {
                let body = Json(json!({
                    "error": "Apenas solicitações pendentes podem ser alteradas.",
                    "currentStatus": current,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                "Cabeçalhos de identidade ausentes ou inválidos.".to_string(),
            ),
            AppError::AccessDenied(perm) => (
                StatusCode::FORBIDDEN,
                format!("Você precisa da permissão '{}' para realizar esta ação.", perm),
            ),
            AppError::ItemNotFound => (
                StatusCode::NOT_FOUND,
                "Item não encontrado. Selecione um item válido.".to_string(),
            ),
            AppError::RequestNotFound => {
                (StatusCode::NOT_FOUND, "Solicitação não encontrada.".to_string())
            }
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::AnomalyNotFound => {
                (StatusCode::NOT_FOUND, "Anomalia não encontrada.".to_string())
            }
            AppError::InvalidQuantity => (
                StatusCode::BAD_REQUEST,
                "A quantidade deve ser maior que zero.".to_string(),
            ),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("O campo '{}' é obrigatório.", field),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
