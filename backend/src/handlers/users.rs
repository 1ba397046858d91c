//! HTTP handlers for user account management (admin only)

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::models::User;
use crate::services::auth::{CreateUserInput, UpdateUserInput};
use crate::services::AuthService;
use crate::AppState;

/// List all user accounts
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    require_admin(&current_user.0)?;
    let service = AuthService::new(state.db, &state.config);
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// Get a single user account
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    require_admin(&current_user.0)?;
    let service = AuthService::new(state.db, &state.config);
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Create a user account
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    require_admin(&current_user.0)?;
    let service = AuthService::new(state.db, &state.config);
    let user = service.create_user(input).await?;
    Ok(Json(user))
}

/// Update a user account
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    require_admin(&current_user.0)?;
    let service = AuthService::new(state.db, &state.config);
    let user = service.update_user(id, input).await?;
    Ok(Json(user))
}

/// Delete a user account
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = AuthService::new(state.db, &state.config);
    service.delete_user(id).await?;
    Ok(Json(()))
}
