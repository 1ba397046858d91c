//! Stock movement models
//!
//! Movements are append-only: a mistake is corrected by deleting the
//! movement (which reverses its inventory effect), never by editing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::FreshnessStatus;
use crate::models::ProductCategory;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Entry,
    Exit,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entry => "entry",
            MovementType::Exit => "exit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(MovementType::Entry),
            "exit" => Some(MovementType::Exit),
            _ => None,
        }
    }
}

/// A recorded stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Cartons moved; always strictly positive, the sign lives in the type
    pub quantity: i32,
    pub customer_id: Option<Uuid>,
    pub movement_type: MovementType,
    /// When the movement was recorded (distinct from the production date)
    pub date: DateTime<Utc>,
    /// Raw production date as entered by the operator (dd/mm/yyyy)
    pub dpj: String,
    pub best_before: DateTime<Utc>,
    pub batch: String,
    pub sub_batch: String,
}

/// Movement joined with product and customer display fields, as shown on
/// listings and receipts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementWithDetails {
    #[serde(flatten)]
    pub movement: Movement,
    pub product_name: String,
    pub family: String,
    pub category: ProductCategory,
    pub customer_name: Option<String>,
    /// Recomputed against "now" on every read, never persisted
    pub freshness: FreshnessStatus,
}
