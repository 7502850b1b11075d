// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Item de Estoque ---
// Um medicamento ou insumo do almoxarifado da farmácia.
// `controlled = true` marca substância regulada: toda saída exige aprovação
// de um farmacêutico antes de o estoque ser baixado.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Amoxicilina 500mg")]
    pub name: String,

    #[schema(example = "Antibióticos")]
    pub category: String,

    pub stock: i64,
    pub min_stock: i64,
    pub expiry_date: NaiveDate,

    #[schema(example = "12.50")]
    pub price: Decimal,

    pub controlled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O SQLite não tem um tipo decimal nativo e o sqlx não mapeia `Decimal`
// para ele; o preço fica guardado como TEXT e é decodificado aqui.
impl<'r> FromRow<'r, SqliteRow> for Item {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let price_raw: String = row.try_get("price")?;
        let price = Decimal::from_str(&price_raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: "price".into(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            stock: row.try_get("stock")?,
            min_stock: row.try_get("min_stock")?,
            expiry_date: row.try_get("expiry_date")?,
            price,
            controlled: row.try_get("controlled")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// --- Ajuste de Estoque ---
// O único caminho sancionado para mudar `stock`:
//   add      -> soma
//   subtract -> subtrai com piso em zero (nunca fica negativo)
//   set      -> substitui incondicionalmente (entrada validada como >= 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockAdjustment {
    Add,
    Subtract,
    Set,
}
