//! Error handling for the Frozen Stock Management backend
//!
//! Provides consistent error responses in English and French

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_fr: String,
    },

    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // Entity lookup failures
    #[error("Product not found")]
    ProductNotFound,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Movement not found")]
    MovementNotFound,

    #[error("User not found")]
    UserNotFound,

    // Business logic errors
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("{resource} is referenced by recorded movements")]
    ReferencedByMovements { resource: String },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message_en: "Invalid username or password".to_string(),
                    message_fr: "Nom d'utilisateur ou mot de passe incorrect".to_string(),
                    field: None,
                },
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_fr: "Le jeton a expiré".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_fr: "Jeton invalide".to_string(),
                    field: None,
                },
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_fr: "Vous n'avez pas la permission d'effectuer cette action"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_fr,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_fr: message_fr.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::InvalidQuantity => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_QUANTITY".to_string(),
                    message_en: "Quantity must be a positive integer".to_string(),
                    message_fr: "La quantité doit être un entier positif".to_string(),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_fr: format!("Un enregistrement avec ce {} existe déjà", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::ProductNotFound => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "PRODUCT_NOT_FOUND".to_string(),
                    message_en: "Product not found".to_string(),
                    message_fr: "Produit introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::CustomerNotFound => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "CUSTOMER_NOT_FOUND".to_string(),
                    message_en: "Customer not found".to_string(),
                    message_fr: "Client introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::MovementNotFound => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "MOVEMENT_NOT_FOUND".to_string(),
                    message_en: "Movement not found".to_string(),
                    message_fr: "Mouvement introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::UserNotFound => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "USER_NOT_FOUND".to_string(),
                    message_en: "User not found".to_string(),
                    message_fr: "Utilisateur introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::InsufficientStock {
                available,
                requested,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Insufficient stock: {} available, {} requested",
                        available, requested
                    ),
                    message_fr: format!(
                        "Stock insuffisant : {} disponible, {} demandé",
                        available, requested
                    ),
                    field: None,
                },
            ),
            AppError::ReferencedByMovements { resource } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "REFERENCED_BY_MOVEMENTS".to_string(),
                    message_en: format!(
                        "{} is referenced by recorded movements and cannot be deleted",
                        resource
                    ),
                    message_fr: format!(
                        "{} est référencé par des mouvements enregistrés et ne peut pas être supprimé",
                        resource
                    ),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_fr: "Une erreur de base de données est survenue".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_fr: "Erreur interne du serveur".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_fr: "Erreur interne du serveur".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<shared::validation::ValidationError> for AppError {
    fn from(e: shared::validation::ValidationError) -> Self {
        AppError::Validation {
            field: e.field.to_string(),
            message: e.message_en.to_string(),
            message_fr: e.message_fr.to_string(),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
