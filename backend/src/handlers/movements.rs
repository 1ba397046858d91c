//! HTTP handlers for stock movements

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_manager, AuthUser, CurrentUser};
use crate::models::MovementWithDetails;
use crate::services::movement::{MovementFilter, RecordMovementInput};
use crate::services::{MovementService, NotificationService};
use crate::AppState;

/// Audit trail for ledger mutations; who did what to which movement
fn audit(user: &AuthUser, action: &str, movement_id: Uuid) {
    tracing::info!(
        user = %user.username,
        user_id = %user.user_id,
        action,
        movement_id = %movement_id,
        "stock movement audit"
    );
}

/// Delivery receipt for a recorded movement, suitable for printing
#[derive(Debug, Serialize)]
pub struct MovementReceipt {
    #[serde(flatten)]
    pub details: MovementWithDetails,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub issuer: String,
}

/// List movements with optional filters
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<MovementWithDetails>>> {
    let service = MovementService::new(state.db);
    let movements = service.list_movements(filter).await?;
    Ok(Json(movements))
}

/// Get a single movement with details
pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovementWithDetails>> {
    let service = MovementService::new(state.db);
    let movement = service.get_movement(id).await?;
    Ok(Json(movement))
}

/// Record a movement (manager or admin); kicks off a background alert check
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<MovementWithDetails>> {
    require_manager(&current_user.0)?;
    let service = MovementService::new(state.db.clone());
    let movement = service.record_movement(input).await?;
    audit(&current_user.0, "record", movement.movement.id);

    NotificationService::new(state.db, state.mailer.clone(), state.config.alerts.clone())
        .spawn_alert_check();

    Ok(Json(movement))
}

/// Delete a movement and reverse its ledger effect (manager or admin)
pub async fn delete_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_manager(&current_user.0)?;
    let service = MovementService::new(state.db);
    service.delete_movement(id).await?;
    audit(&current_user.0, "delete", id);
    Ok(Json(()))
}

/// Delivery receipt for a movement
pub async fn get_movement_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovementReceipt>> {
    let service = MovementService::new(state.db);
    let details = service.get_movement(id).await?;
    Ok(Json(MovementReceipt {
        details,
        issued_at: chrono::Utc::now(),
        issuer: current_user.0.username,
    }))
}
