//! API route definitions

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::middleware::auth_middleware;
use crate::AppState;

/// Build the /api/v1 router
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/customers", customer_routes())
        .nest("/movements", movement_routes())
        .nest("/inventory", inventory_routes())
        .nest("/reports", reporting_routes())
}

/// Public authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
}

/// User management routes (authenticated; admin checks in handlers)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/", post(handlers::users::create_user))
        .route("/:id", get(handlers::users::get_user))
        .route("/:id", put(handlers::users::update_user))
        .route("/:id", delete(handlers::users::delete_user))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::products::list_products))
        .route("/", post(handlers::products::create_product))
        .route("/:id", get(handlers::products::get_product))
        .route("/:id", put(handlers::products::update_product))
        .route("/:id", delete(handlers::products::delete_product))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer registry routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::customers::list_customers))
        .route("/", post(handlers::customers::create_customer))
        .route("/:id", get(handlers::customers::get_customer))
        .route("/:id", put(handlers::customers::update_customer))
        .route("/:id", delete(handlers::customers::delete_customer))
        .route(
            "/:id/statement",
            get(handlers::customers::get_customer_statement),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock movement routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::movements::list_movements))
        .route("/", post(handlers::movements::record_movement))
        .route("/:id", get(handlers::movements::get_movement))
        .route("/:id", delete(handlers::movements::delete_movement))
        .route("/:id/receipt", get(handlers::movements::get_movement_receipt))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory level routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::inventory::list_levels))
        .route("/low-stock", get(handlers::inventory::low_stock))
        .route(
            "/:product_id/quantity",
            get(handlers::inventory::get_quantity),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::reporting::dashboard))
        .route(
            "/movements.csv",
            get(handlers::reporting::export_movements_csv),
        )
        .route("/alerts/check", post(handlers::reporting::check_alerts))
        .route_layer(middleware::from_fn(auth_middleware))
}
