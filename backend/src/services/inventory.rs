//! Inventory ledger service
//!
//! Per-product quantities are a materialized sum of recorded movements:
//! quantity == sum(entries) - sum(exits). Deltas are applied inside the same
//! transaction as the movement row, and an exit checks sufficiency and
//! deducts in one statement so concurrent exits cannot overdraw.

use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{MovementType, ProductCategory};

use crate::error::{AppError, AppResult};
use crate::services::product::parse_category;

#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Stock level for one product, joined with catalog details
#[derive(Debug, Serialize)]
pub struct InventoryLevel {
    pub product_id: Uuid,
    pub product_name: String,
    pub family: String,
    pub category: ProductCategory,
    pub quantity: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct LevelRow {
    product_id: Uuid,
    product_name: String,
    family: String,
    category: String,
    quantity: i32,
}

impl LevelRow {
    fn into_level(self) -> AppResult<InventoryLevel> {
        let category = parse_category(&self.category)?;
        Ok(InventoryLevel {
            product_id: self.product_id,
            product_name: self.product_name,
            family: self.family,
            category,
            quantity: self.quantity,
        })
    }
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current quantity for a product; zero when no movements were recorded
    pub async fn get_quantity(&self, product_id: Uuid) -> AppResult<i32> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::ProductNotFound);
        }

        let quantity = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT quantity FROM inventory WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .flatten()
        .unwrap_or(0);

        Ok(quantity)
    }

    /// All stock levels with product details, ordered by product name
    pub async fn list_levels(&self) -> AppResult<Vec<InventoryLevel>> {
        let rows = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.family, p.category,
                   COALESCE(i.quantity, 0) AS quantity
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LevelRow::into_level).collect()
    }

    /// Products at or below the given threshold
    pub async fn low_stock(&self, threshold: i32) -> AppResult<Vec<InventoryLevel>> {
        let rows = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.family, p.category,
                   COALESCE(i.quantity, 0) AS quantity
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            WHERE COALESCE(i.quantity, 0) <= $1
            ORDER BY quantity, p.name
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LevelRow::into_level).collect()
    }

    /// Apply a movement's effect to the ledger, inside the caller's
    /// transaction. Entries add via upsert; exits check sufficiency and
    /// deduct in a single conditional UPDATE.
    pub async fn apply_delta(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
    ) -> AppResult<()> {
        match movement_type {
            MovementType::Entry => {
                sqlx::query(
                    r#"
                    INSERT INTO inventory (product_id, quantity)
                    VALUES ($1, $2)
                    ON CONFLICT (product_id)
                    DO UPDATE SET quantity = inventory.quantity + EXCLUDED.quantity
                    "#,
                )
                .bind(product_id)
                .bind(quantity)
                .execute(&mut **tx)
                .await?;
            }
            MovementType::Exit => {
                let result = sqlx::query(
                    r#"
                    UPDATE inventory
                    SET quantity = quantity - $1
                    WHERE product_id = $2 AND quantity >= $1
                    "#,
                )
                .bind(quantity)
                .bind(product_id)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    let available = sqlx::query_scalar::<_, Option<i32>>(
                        "SELECT quantity FROM inventory WHERE product_id = $1",
                    )
                    .bind(product_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .flatten()
                    .unwrap_or(0);

                    return Err(AppError::InsufficientStock {
                        available,
                        requested: quantity,
                    });
                }
            }
        }

        Ok(())
    }

    /// Undo a movement's effect when the movement is deleted. An entry
    /// reversal subtracts unconditionally and may drive the level negative;
    /// that is surfaced by the low-stock report rather than blocked here.
    pub async fn reverse_delta(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
    ) -> AppResult<()> {
        let delta = match movement_type {
            MovementType::Entry => -quantity,
            MovementType::Exit => quantity,
        };

        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, quantity)
            VALUES ($1, $2)
            ON CONFLICT (product_id)
            DO UPDATE SET quantity = inventory.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
