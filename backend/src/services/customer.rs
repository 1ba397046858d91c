//! Customer registry service
//!
//! Customers carry the Moroccan fiscal identifiers (RC, CNSS, patente, ICE)
//! needed on delivery documents.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::Customer;
use shared::validation::validate_name;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Input for creating a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub gsm: Option<String>,
    pub rc: Option<String>,
    pub cnss: Option<String>,
    pub patente: Option<String>,
    pub ice: Option<String>,
    pub observations: Option<String>,
}

/// Input for updating a customer; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub gsm: Option<String>,
    pub rc: Option<String>,
    pub cnss: Option<String>,
    pub patente: Option<String>,
    pub ice: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    city: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    gsm: Option<String>,
    rc: Option<String>,
    cnss: Option<String>,
    patente: Option<String>,
    ice: Option<String>,
    observations: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            city: row.city,
            country: row.country,
            phone: row.phone,
            gsm: row.gsm,
            rc: row.rc,
            cnss: row.cnss,
            patente: row.patente,
            ice: row.ice,
            observations: row.observations,
            created_at: row.created_at,
        }
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, name, city, country, phone, gsm, rc, cnss, patente, ice, observations, created_at";

impl CustomerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_customer(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        validate_name(&input.name)?;

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (id, name, city, country, phone, gsm, rc, cnss, patente, ice, observations)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(&input.gsm)
        .bind(&input.rc)
        .bind(&input.cnss)
        .bind(&input.patente)
        .bind(&input.ice)
        .bind(&input.observations)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        tracing::info!(customer = %row.name, "customer created");

        Ok(row.into())
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::CustomerNotFound)?;

        Ok(row.into())
    }

    /// List customers, optionally filtered by a case-insensitive name search
    pub async fn list_customers(&self, search: Option<&str>) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            "#
        ))
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    pub async fn update_customer(&self, id: Uuid, input: UpdateCustomerInput) -> AppResult<Customer> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                city = COALESCE($3, city),
                country = COALESCE($4, country),
                phone = COALESCE($5, phone),
                gsm = COALESCE($6, gsm),
                rc = COALESCE($7, rc),
                cnss = COALESCE($8, cnss),
                patente = COALESCE($9, patente),
                ice = COALESCE($10, ice),
                observations = COALESCE($11, observations)
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(&input.gsm)
        .bind(&input.rc)
        .bind(&input.cnss)
        .bind(&input.patente)
        .bind(&input.ice)
        .bind(&input.observations)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?
        .ok_or(AppError::CustomerNotFound)?;

        Ok(row.into())
    }

    /// Delete a customer; refused while movements reference it
    pub async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        let referenced =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movements WHERE customer_id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        if referenced > 0 {
            return Err(AppError::ReferencedByMovements {
                resource: "Customer".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CustomerNotFound);
        }

        Ok(())
    }
}
