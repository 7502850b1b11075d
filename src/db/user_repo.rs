// src/db/user_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// O cadastro de usuários pertence a outro sistema do hospital; este
// repositório é somente leitura (nome do aprovador, joins de exibição).
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.find_by_id(&self.pool, id).await
    }
}
