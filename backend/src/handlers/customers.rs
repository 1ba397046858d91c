//! HTTP handlers for the customer registry

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_manager, CurrentUser};
use crate::models::Customer;
use crate::services::customer::{CreateCustomerInput, UpdateCustomerInput};
use crate::services::reporting::CustomerStatement;
use crate::services::{CustomerService, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    pub search: Option<String>,
}

/// List customers, optionally filtered by name search
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    let customers = service.list_customers(query.search.as_deref()).await?;
    Ok(Json(customers))
}

/// Get a single customer
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.get_customer(id).await?;
    Ok(Json(customer))
}

/// Create a customer (manager or admin)
pub async fn create_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    require_manager(&current_user.0)?;
    let service = CustomerService::new(state.db);
    let customer = service.create_customer(input).await?;
    Ok(Json(customer))
}

/// Update a customer (manager or admin)
pub async fn update_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    require_manager(&current_user.0)?;
    let service = CustomerService::new(state.db);
    let customer = service.update_customer(id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer (manager or admin); refused while movements reference it
pub async fn delete_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_manager(&current_user.0)?;
    let service = CustomerService::new(state.db);
    service.delete_customer(id).await?;
    Ok(Json(()))
}

/// Statement of account: totals and movement history for one customer
pub async fn get_customer_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CustomerStatement>> {
    let service = ReportingService::new(state.db);
    let statement = service.customer_statement(id).await?;
    Ok(Json(statement))
}
