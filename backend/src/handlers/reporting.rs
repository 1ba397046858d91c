//! HTTP handlers for reports and exports

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::middleware::{require_manager, CurrentUser};
use crate::services::movement::MovementFilter;
use crate::services::notification::AlertSummary;
use crate::services::reporting::Dashboard;
use crate::services::{NotificationService, ReportingService};
use crate::AppState;

/// Dashboard snapshot for the overview screen
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    let service = ReportingService::new(state.db);
    let dashboard = service
        .dashboard(state.config.alerts.low_stock_threshold)
        .await?;
    Ok(Json(dashboard))
}

/// Movement log as CSV, respecting the same filters as the movement list
pub async fn export_movements_csv(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db);
    let csv = service.export_movements_csv(filter).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"movements.csv\"",
            ),
        ],
        csv,
    ))
}

/// Run the inventory alert check now and report what was found
pub async fn check_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<AlertSummary>> {
    require_manager(&current_user.0)?;
    let service =
        NotificationService::new(state.db, state.mailer.clone(), state.config.alerts.clone());
    let summary = service.check_inventory_alerts().await?;
    Ok(Json(summary))
}
