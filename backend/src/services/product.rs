//! Product catalog service
//!
//! Every product carries a category that drives shelf-life and batch coding.
//! Creating a product also seeds its inventory level at zero so stock lookups
//! never have to special-case missing rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use serde::Deserialize;
use shared::models::{Product, ProductCategory};
use shared::validation::validate_name;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub family: String,
    pub category: String,
}

/// Input for updating a product; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub family: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    family: String,
    category: String,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> AppResult<Product> {
        let category = parse_category(&self.category)?;
        Ok(Product {
            id: self.id,
            name: self.name,
            family: self.family,
            category,
            created_at: self.created_at,
        })
    }
}

/// Parse a stored category string, failing as an internal error since the
/// database constrains the column to known values
pub(crate) fn parse_category(category: &str) -> AppResult<ProductCategory> {
    ProductCategory::from_str(category)
        .ok_or_else(|| AppError::Internal(format!("Unknown category in database: {}", category)))
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product and seed its inventory level at zero
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_name(&input.name)?;

        let category =
            ProductCategory::from_str(&input.category).ok_or_else(|| AppError::Validation {
                field: "category".to_string(),
                message: "Category must be one of: msm, offal, whole, cut".to_string(),
                message_fr: "La catégorie doit être : msm, offal, whole ou cut".to_string(),
            })?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, name, family, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, family, category, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.family)
        .bind(category.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        sqlx::query("INSERT INTO inventory (product_id, quantity) VALUES ($1, 0)")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(product = %row.name, category = %row.category, "product created");

        row.into_product()
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, family, category, created_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::ProductNotFound)?
        .into_product()
    }

    /// List products, optionally filtered by family or category
    pub async fn list_products(
        &self,
        family: Option<&str>,
        category: Option<&str>,
    ) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, family, category, created_at
            FROM products
            WHERE ($1::text IS NULL OR family = $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY name
            "#,
        )
        .bind(family)
        .bind(category)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }

        let category = match &input.category {
            Some(c) => Some(
                ProductCategory::from_str(c)
                    .ok_or_else(|| AppError::Validation {
                        field: "category".to_string(),
                        message: "Category must be one of: msm, offal, whole, cut".to_string(),
                        message_fr: "La catégorie doit être : msm, offal, whole ou cut".to_string(),
                    })?
                    .as_str(),
            ),
            None => None,
        };

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                family = COALESCE($3, family),
                category = COALESCE($4, category)
            WHERE id = $1
            RETURNING id, name, family, category, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.family)
        .bind(category)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?
        .ok_or(AppError::ProductNotFound)?;

        row.into_product()
    }

    /// Delete a product; refused while movements reference it so the
    /// traceability history stays intact
    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let referenced =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movements WHERE product_id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        if referenced > 0 {
            return Err(AppError::ReferencedByMovements {
                resource: "Product".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM inventory WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}
