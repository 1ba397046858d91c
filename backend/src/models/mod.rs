//! Database models for the Frozen Stock Management backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
