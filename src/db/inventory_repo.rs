// src/db/inventory_repo.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{Item, StockAdjustment},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---
    // Leituras simples podem usar a pool principal.

    pub async fn get_all_items(&self) -> Result<Vec<Item>, AppError> {
        let items =
            sqlx::query_as::<_, Item>("SELECT * FROM inventory_items ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    /// Itens no limiar de reposição (`stock <= min_stock`). O limiar é
    /// consultivo: nada impede o estoque de continuar caindo até zero.
    pub async fn get_low_stock(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM inventory_items WHERE stock <= min_stock ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // `find_by_id` aceita um executor para poder rodar DENTRO da transação
    // do engine de solicitações (a checagem de saldo precisa ver o mesmo
    // snapshot que a baixa de estoque).
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM inventory_items WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        name: &str,
        category: &str,
        stock: i64,
        min_stock: i64,
        expiry_date: NaiveDate,
        price: Decimal,
        controlled: bool,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO inventory_items
                (id, name, category, stock, min_stock, expiry_date, price, controlled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(category)
        .bind(stock)
        .bind(min_stock)
        .bind(expiry_date)
        .bind(price.to_string())
        .bind(controlled)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Edição de catálogo. O `stock` fica de fora de propósito: a única
    /// porta de entrada para mudar saldo é `adjust_stock`.
    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        category: &str,
        min_stock: i64,
        expiry_date: NaiveDate,
        price: Decimal,
        controlled: bool,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE inventory_items
            SET name = ?, category = ?, min_stock = ?, expiry_date = ?, price = ?, controlled = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(min_stock)
        .bind(expiry_date)
        .bind(price.to_string())
        .bind(controlled)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ItemNotFound)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }

    /// O ajuste atômico de saldo. Um único UPDATE, com o piso em zero
    /// resolvido no próprio SQL:
    ///   add      -> stock + amount
    ///   subtract -> MAX(0, stock - amount)
    ///   set      -> amount
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: i64,
        mode: StockAdjustment,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = match mode {
            StockAdjustment::Add => {
                "UPDATE inventory_items SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1 RETURNING *"
            }
            StockAdjustment::Subtract => {
                "UPDATE inventory_items SET stock = MAX(0, stock - ?2), updated_at = ?3 WHERE id = ?1 RETURNING *"
            }
            StockAdjustment::Set => {
                "UPDATE inventory_items SET stock = ?2, updated_at = ?3 WHERE id = ?1 RETURNING *"
            }
        };

        sqlx::query_as::<_, Item>(sql)
            .bind(id)
            .bind(amount)
            .bind(Utc::now())
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ItemNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{seed_item, test_state};

    #[tokio::test]
    async fn adjust_stock_add_soma_ao_saldo() {
        let state = test_state().await;
        let repo = InventoryRepository::new(state.db_pool.clone());
        let item_id = seed_item(&state.db_pool, "Dipirona 500mg", 30, 10, false).await;

        let item = repo
            .adjust_stock(&state.db_pool, item_id, 20, StockAdjustment::Add)
            .await
            .unwrap();
        assert_eq!(item.stock, 50);
    }

    #[tokio::test]
    async fn adjust_stock_subtract_tem_piso_em_zero() {
        let state = test_state().await;
        let repo = InventoryRepository::new(state.db_pool.clone());
        let item_id = seed_item(&state.db_pool, "Dipirona 500mg", 30, 10, false).await;

        // Subtrair 100 de 30 não pode deixar saldo negativo.
        let item = repo
            .adjust_stock(&state.db_pool, item_id, 100, StockAdjustment::Subtract)
            .await
            .unwrap();
        assert_eq!(item.stock, 0);
    }

    #[tokio::test]
    async fn adjust_stock_set_substitui_incondicionalmente() {
        let state = test_state().await;
        let repo = InventoryRepository::new(state.db_pool.clone());
        let item_id = seed_item(&state.db_pool, "Dipirona 500mg", 30, 10, false).await;

        let item = repo
            .adjust_stock(&state.db_pool, item_id, 7, StockAdjustment::Set)
            .await
            .unwrap();
        assert_eq!(item.stock, 7);
    }

    #[tokio::test]
    async fn adjust_stock_de_item_inexistente_retorna_not_found() {
        let state = test_state().await;
        let repo = InventoryRepository::new(state.db_pool.clone());

        let err = repo
            .adjust_stock(&state.db_pool, Uuid::new_v4(), 1, StockAdjustment::Add)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound));
    }

    #[tokio::test]
    async fn update_item_nao_toca_no_saldo() {
        let state = test_state().await;
        let repo = InventoryRepository::new(state.db_pool.clone());
        let item_id = seed_item(&state.db_pool, "Dipirona 500mg", 30, 10, false).await;

        let item = repo
            .update_item(
                &state.db_pool,
                item_id,
                "Dipirona 1g",
                "Analgésicos",
                15,
                NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
                Decimal::new(990, 2),
                false,
            )
            .await
            .unwrap();

        assert_eq!(item.name, "Dipirona 1g");
        assert_eq!(item.min_stock, 15);
        assert_eq!(item.stock, 30);
    }
}
