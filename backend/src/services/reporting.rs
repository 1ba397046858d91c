//! Reporting service
//!
//! Dashboard aggregates, per-customer statements and the CSV export of the
//! movement log.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::batch::classify_freshness;
use shared::models::{Customer, MovementWithDetails};

use crate::error::{AppError, AppResult};
use crate::services::movement::MovementFilter;
use crate::services::{CustomerService, MovementService};

#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard snapshot for the overview screen
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_products: i64,
    pub total_quantity: i64,
    pub low_stock_count: i64,
    pub expired_count: i64,
    pub expiring_soon_count: i64,
    pub recent_movements: Vec<MovementWithDetails>,
}

/// Per-customer account of recorded movements
#[derive(Debug, Serialize)]
pub struct CustomerStatement {
    pub customer: Customer,
    pub total_entries: i64,
    pub total_exits: i64,
    pub balance: i64,
    pub movements: Vec<MovementWithDetails>,
}

#[derive(Debug, sqlx::FromRow)]
struct StatementTotalsRow {
    total_entries: Option<i64>,
    total_exits: Option<i64>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the dashboard snapshot
    pub async fn dashboard(&self, low_stock_threshold: i32) -> AppResult<Dashboard> {
        let total_products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;

        let total_quantity =
            sqlx::query_scalar::<_, Option<i64>>("SELECT SUM(quantity)::bigint FROM inventory")
                .fetch_one(&self.db)
                .await?
                .unwrap_or(0);

        let low_stock_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            WHERE COALESCE(i.quantity, 0) <= $1
            "#,
        )
        .bind(low_stock_threshold)
        .fetch_one(&self.db)
        .await?;

        // Distinct products with at least one entry already past, or within
        // 30 days of, its best-before date
        let expired_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT product_id)
            FROM movements
            WHERE movement_type = 'entry' AND best_before < NOW()
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let expiring_soon_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT product_id)
            FROM movements
            WHERE movement_type = 'entry'
              AND best_before >= NOW()
              AND best_before <= NOW() + INTERVAL '30 days'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let movement_service = MovementService::new(self.db.clone());
        let mut recent_movements = movement_service
            .list_movements(MovementFilter::default())
            .await?;
        recent_movements.truncate(10);

        Ok(Dashboard {
            total_products,
            total_quantity,
            low_stock_count,
            expired_count,
            expiring_soon_count,
            recent_movements,
        })
    }

    /// Build the statement of account for one customer
    pub async fn customer_statement(&self, customer_id: Uuid) -> AppResult<CustomerStatement> {
        let customer_service = CustomerService::new(self.db.clone());
        let customer = customer_service.get_customer(customer_id).await?;

        let totals = sqlx::query_as::<_, StatementTotalsRow>(
            r#"
            SELECT
                SUM(quantity) FILTER (WHERE movement_type = 'entry')::bigint AS total_entries,
                SUM(quantity) FILTER (WHERE movement_type = 'exit')::bigint AS total_exits
            FROM movements
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        let total_entries = totals.total_entries.unwrap_or(0);
        let total_exits = totals.total_exits.unwrap_or(0);

        let movement_service = MovementService::new(self.db.clone());
        let movements = movement_service
            .list_movements(MovementFilter {
                customer_id: Some(customer_id),
                ..MovementFilter::default()
            })
            .await?;

        Ok(CustomerStatement {
            customer,
            total_entries,
            total_exits,
            balance: total_entries - total_exits,
            movements,
        })
    }

    /// Export the movement log as CSV, respecting the same filters as the
    /// movement list
    pub async fn export_movements_csv(&self, filter: MovementFilter) -> AppResult<Vec<u8>> {
        let movement_service = MovementService::new(self.db.clone());
        let movements = movement_service.list_movements(filter).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record([
                "ID",
                "Date",
                "Product",
                "Family",
                "Category",
                "Type",
                "Quantity",
                "Customer",
                "Batch",
                "Sub-batch",
                "DPJ",
                "Best before",
                "Status",
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

        let now = Utc::now();
        for m in &movements {
            let status = classify_freshness(m.movement.best_before, now);
            writer
                .write_record([
                    m.movement.id.to_string(),
                    m.movement.date.format("%d/%m/%Y %H:%M").to_string(),
                    m.product_name.clone(),
                    m.family.clone(),
                    m.category.as_str().to_string(),
                    m.movement.movement_type.as_str().to_string(),
                    m.movement.quantity.to_string(),
                    m.customer_name.clone().unwrap_or_default(),
                    m.movement.batch.clone(),
                    m.movement.sub_batch.clone(),
                    m.movement.dpj.clone(),
                    m.movement.best_before.format("%d/%m/%Y").to_string(),
                    status.as_str().to_string(),
                ])
                .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))
    }
}
