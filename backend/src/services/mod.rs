//! Business logic services

pub mod auth;
pub mod customer;
pub mod inventory;
pub mod movement;
pub mod notification;
pub mod product;
pub mod reporting;

pub use auth::AuthService;
pub use customer::CustomerService;
pub use inventory::InventoryService;
pub use movement::MovementService;
pub use notification::NotificationService;
pub use product::ProductService;
pub use reporting::ReportingService;
