//! HTTP request handlers

pub mod auth;
pub mod customers;
pub mod health;
pub mod inventory;
pub mod movements;
pub mod products;
pub mod reporting;
pub mod users;

pub use health::health_check;
