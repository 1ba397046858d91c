//! HTTP handlers for inventory levels

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::InventoryLevel;
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct QuantityResponse {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

/// All stock levels with product details
pub async fn list_levels(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryLevel>>> {
    let service = InventoryService::new(state.db);
    let levels = service.list_levels().await?;
    Ok(Json(levels))
}

/// Current quantity for one product
pub async fn get_quantity(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<QuantityResponse>> {
    let service = InventoryService::new(state.db);
    let quantity = service.get_quantity(product_id).await?;
    Ok(Json(QuantityResponse {
        product_id,
        quantity,
    }))
}

/// Products at or below the low-stock threshold; defaults to the configured
/// threshold
pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<InventoryLevel>>> {
    let threshold = query
        .threshold
        .unwrap_or(state.config.alerts.low_stock_threshold);
    let service = InventoryService::new(state.db);
    let levels = service.low_stock(threshold).await?;
    Ok(Json(levels))
}
