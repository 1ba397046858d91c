//! Domain models for the Frozen Stock Management system

mod customer;
mod movement;
mod product;
mod user;

pub use customer::*;
pub use movement::*;
pub use product::*;
pub use user::*;
