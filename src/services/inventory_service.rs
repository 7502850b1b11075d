// src/services/inventory_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{Item, StockAdjustment},
    services::activity_service::ActivityService,
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    activity_service: ActivityService,
    pool: SqlitePool,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        activity_service: ActivityService,
        pool: SqlitePool,
    ) -> Self {
        Self {
            inventory_repo,
            activity_service,
            pool,
        }
    }

    // ---
    // Leituras
    // ---

    pub async fn get_all_items(&self) -> Result<Vec<Item>, AppError> {
        self.inventory_repo.get_all_items().await
    }

    pub async fn get_low_stock(&self) -> Result<Vec<Item>, AppError> {
        self.inventory_repo.get_low_stock().await
    }

    pub async fn find_item(&self, id: Uuid) -> Result<Item, AppError> {
        self.inventory_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::ItemNotFound)
    }

    // ---
    // Escritas (com registro de atividade)
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create_item(
        &self,
        user_id: Uuid,
        name: &str,
        category: &str,
        stock: i64,
        min_stock: i64,
        expiry_date: NaiveDate,
        price: Decimal,
        controlled: bool,
    ) -> Result<Item, AppError> {
        let item = self
            .inventory_repo
            .create_item(
                &self.pool, name, category, stock, min_stock, expiry_date, price, controlled,
            )
            .await?;

        self.activity_service
            .record(
                user_id,
                &format!("Adicionou novo item ao estoque: {}", item.name),
                "COMPLETED",
            )
            .await;

        Ok(item)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_item(
        &self,
        user_id: Uuid,
        id: Uuid,
        name: &str,
        category: &str,
        min_stock: i64,
        expiry_date: NaiveDate,
        price: Decimal,
        controlled: bool,
    ) -> Result<Item, AppError> {
        let item = self
            .inventory_repo
            .update_item(
                &self.pool, id, name, category, min_stock, expiry_date, price, controlled,
            )
            .await?;

        self.activity_service
            .record(
                user_id,
                &format!("Atualizou item do estoque: {}", item.name),
                "COMPLETED",
            )
            .await;

        Ok(item)
    }

    pub async fn delete_item(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        // Busca antes de remover só para o log ficar legível.
        let item = self.find_item(id).await?;
        self.inventory_repo.delete_item(&self.pool, id).await?;

        self.activity_service
            .record(
                user_id,
                &format!("Removeu item do estoque: {}", item.name),
                "COMPLETED",
            )
            .await;

        Ok(())
    }

    /// Ajuste manual de saldo (entrada de compra, correção de contagem,
    /// perda). As baixas automáticas das solicitações NÃO passam por aqui;
    /// elas chamam o mesmo primitivo do repositório dentro da transação do
    /// engine.
    pub async fn adjust_stock(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        amount: i64,
        mode: StockAdjustment,
        reason: Option<&str>,
    ) -> Result<Item, AppError> {
        if amount < 0 {
            return Err(AppError::InvalidQuantity);
        }

        let item = self
            .inventory_repo
            .adjust_stock(&self.pool, item_id, amount, mode)
            .await?;

        let mode_label = match mode {
            StockAdjustment::Add => "add",
            StockAdjustment::Subtract => "subtract",
            StockAdjustment::Set => "set",
        };
        let mut description =
            format!("Ajustou estoque de {}: {} {}", item.name, mode_label, amount);
        if let Some(reason) = reason {
            description.push_str(&format!(" (Motivo: {})", reason));
        }
        self.activity_service
            .record(user_id, &description, "COMPLETED")
            .await;

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{seed_item, seed_user, test_state};
    use crate::models::auth::Role;

    #[tokio::test]
    async fn ajuste_manual_rejeita_quantidade_negativa() {
        let state = test_state().await;
        let pharmacist = seed_user(&state.db_pool, "Carla Farmacêutica", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Soro Fisiológico", 10, 2, false).await;

        let err = state
            .inventory_service
            .adjust_stock(pharmacist, item_id, -5, StockAdjustment::Add, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity));

        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 10);
    }

    #[tokio::test]
    async fn ajuste_manual_registra_atividade() {
        let state = test_state().await;
        let pharmacist = seed_user(&state.db_pool, "Carla Farmacêutica", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Soro Fisiológico", 10, 2, false).await;

        state
            .inventory_service
            .adjust_stock(
                pharmacist,
                item_id,
                30,
                StockAdjustment::Add,
                Some("Compra mensal"),
            )
            .await
            .unwrap();

        let logs = state.activity_service.list().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].description.contains("Soro Fisiológico"));
        assert!(logs[0].description.contains("Compra mensal"));
    }
}
