//! Stock movement service
//!
//! Records entries and exits. A recorded movement carries the traceability
//! codes and best-before date derived at recording time; the inventory
//! ledger is updated in the same transaction so the stored quantity always
//! equals the sum of entries minus the sum of exits.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::batch::{
    batch_codes, best_before, classify_freshness, parse_production_date, FreshnessStatus,
};
use shared::models::{Movement, MovementType, MovementWithDetails};
use shared::validation::validate_quantity;

use crate::error::{AppError, AppResult};
use crate::services::product::parse_category;
use crate::services::InventoryService;

#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Input for recording a movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub movement_type: String,
    pub customer_id: Option<Uuid>,
    /// Production date as dd/mm/yyyy; missing or malformed falls back to today
    pub dpj: Option<String>,
}

/// Filters for listing movements; all optional, combined with AND
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    /// Case-insensitive product name substring
    pub product: Option<String>,
    pub customer_id: Option<Uuid>,
    pub movement_type: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct MovementDetailRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i32,
    customer_id: Option<Uuid>,
    movement_type: String,
    date: DateTime<Utc>,
    dpj: String,
    best_before: DateTime<Utc>,
    batch: String,
    sub_batch: String,
    product_name: String,
    family: String,
    category: String,
    customer_name: Option<String>,
}

impl MovementDetailRow {
    /// Freshness is classified at read time so the same row can move from
    /// ok to warning to expired without ever being rewritten.
    fn into_details(self, now: DateTime<Utc>) -> AppResult<MovementWithDetails> {
        let movement_type = MovementType::from_str(&self.movement_type).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown movement type in database: {}",
                self.movement_type
            ))
        })?;
        let category = parse_category(&self.category)?;
        let freshness: FreshnessStatus = classify_freshness(self.best_before, now);

        Ok(MovementWithDetails {
            movement: Movement {
                id: self.id,
                product_id: self.product_id,
                quantity: self.quantity,
                customer_id: self.customer_id,
                movement_type,
                date: self.date,
                dpj: self.dpj,
                best_before: self.best_before,
                batch: self.batch,
                sub_batch: self.sub_batch,
            },
            product_name: self.product_name,
            family: self.family,
            category,
            customer_name: self.customer_name,
            freshness,
        })
    }
}

const DETAIL_QUERY: &str = r#"
    SELECT m.id, m.product_id, m.quantity, m.customer_id, m.movement_type,
           m.date, m.dpj, m.best_before, m.batch, m.sub_batch,
           p.name AS product_name, p.family, p.category,
           c.name AS customer_name
    FROM movements m
    JOIN products p ON p.id = m.product_id
    LEFT JOIN customers c ON c.id = m.customer_id
"#;

impl MovementService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a movement and update the inventory ledger atomically
    pub async fn record_movement(
        &self,
        input: RecordMovementInput,
    ) -> AppResult<MovementWithDetails> {
        validate_quantity(input.quantity).map_err(|_| AppError::InvalidQuantity)?;

        let movement_type =
            MovementType::from_str(&input.movement_type).ok_or_else(|| AppError::Validation {
                field: "movement_type".to_string(),
                message: "Movement type must be entry or exit".to_string(),
                message_fr: "Le type de mouvement doit être entry ou exit".to_string(),
            })?;

        let product = sqlx::query_as::<_, (String, String)>(
            "SELECT name, category FROM products WHERE id = $1",
        )
        .bind(input.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::ProductNotFound)?;
        let (product_name, category_str) = product;
        let category = parse_category(&category_str)?;

        if let Some(customer_id) = input.customer_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
            )
            .bind(customer_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::CustomerNotFound);
            }
        }

        let now = Utc::now();
        let today = now.date_naive();

        // Missing or malformed DPJ falls back to today; the operator at the
        // scale cannot be blocked on a typo, so we log and carry on.
        let production_date = match input.dpj.as_deref() {
            Some(raw) => match parse_production_date(raw) {
                Ok(date) => date,
                Err(_) => {
                    tracing::warn!(dpj = raw, "malformed production date, using today");
                    today
                }
            },
            None => today,
        };

        let codes = batch_codes(production_date, &product_name);
        let bbd = best_before(production_date, category);
        let dpj = production_date.format("%d/%m/%Y").to_string();

        let mut tx = self.db.begin().await?;

        let movement_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO movements
                (id, product_id, quantity, customer_id, movement_type, date,
                 dpj, best_before, batch, sub_batch)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.customer_id)
        .bind(movement_type.as_str())
        .bind(now)
        .bind(&dpj)
        .bind(bbd)
        .bind(&codes.batch)
        .bind(&codes.sub_batch)
        .fetch_one(&mut *tx)
        .await?;

        InventoryService::apply_delta(&mut tx, input.product_id, movement_type, input.quantity)
            .await?;

        tx.commit().await?;

        tracing::info!(
            movement_id = %movement_id,
            product = %product_name,
            movement_type = movement_type.as_str(),
            quantity = input.quantity,
            batch = %codes.batch,
            "movement recorded"
        );

        self.get_movement(movement_id).await
    }

    /// Get one movement with product, customer and freshness details
    pub async fn get_movement(&self, id: Uuid) -> AppResult<MovementWithDetails> {
        let row = sqlx::query_as::<_, MovementDetailRow>(&format!(
            "{DETAIL_QUERY} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::MovementNotFound)?;

        row.into_details(Utc::now())
    }

    /// List movements, newest first, with optional filters
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> AppResult<Vec<MovementWithDetails>> {
        if let Some(mt) = filter.movement_type.as_deref() {
            if MovementType::from_str(mt).is_none() {
                return Err(AppError::Validation {
                    field: "movement_type".to_string(),
                    message: "Movement type must be entry or exit".to_string(),
                    message_fr: "Le type de mouvement doit être entry ou exit".to_string(),
                });
            }
        }

        let rows = sqlx::query_as::<_, MovementDetailRow>(&format!(
            r#"
            {DETAIL_QUERY}
            WHERE ($1::uuid IS NULL OR m.product_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%')
              AND ($3::uuid IS NULL OR m.customer_id = $3)
              AND ($4::text IS NULL OR m.movement_type = $4)
              AND ($5::timestamptz IS NULL OR m.date >= $5)
              AND ($6::timestamptz IS NULL OR m.date <= $6)
            ORDER BY m.date DESC
            "#
        ))
        .bind(filter.product_id)
        .bind(&filter.product)
        .bind(filter.customer_id)
        .bind(&filter.movement_type)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(&self.db)
        .await?;

        let now = Utc::now();
        rows.into_iter().map(|row| row.into_details(now)).collect()
    }

    /// Delete a movement and reverse its effect on the ledger
    pub async fn delete_movement(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // Lock the row so a concurrent delete cannot reverse the same
        // movement twice
        let row = sqlx::query_as::<_, (Uuid, String, i32)>(
            "SELECT product_id, movement_type, quantity FROM movements WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::MovementNotFound)?;

        let (product_id, movement_type_str, quantity) = row;
        let movement_type = MovementType::from_str(&movement_type_str).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown movement type in database: {}",
                movement_type_str
            ))
        })?;

        InventoryService::reverse_delta(&mut tx, product_id, movement_type, quantity).await?;

        sqlx::query("DELETE FROM movements WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(movement_id = %id, "movement deleted and ledger reversed");

        Ok(())
    }
}
