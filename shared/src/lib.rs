//! Shared types and domain logic for the Frozen Stock Management system
//!
//! This crate contains the models and the pure traceability core (batch
//! codes, expiry computation, freshness classification) shared between the
//! backend and any future clients.

pub mod batch;
pub mod models;
pub mod validation;

pub use batch::*;
pub use models::*;
pub use validation::*;
