//! Product catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A frozen product tracked by the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Commercial display name (e.g. "Poulet Entier")
    pub name: String,
    /// Free-form commercial grouping (e.g. "Poulet", "Dinde")
    pub family: String,
    pub category: ProductCategory,
    pub created_at: DateTime<Utc>,
}

/// Regulatory product category; governs the best-before offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Mechanically separated meat
    Msm,
    Offal,
    Whole,
    Cut,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Msm => "msm",
            ProductCategory::Offal => "offal",
            ProductCategory::Whole => "whole",
            ProductCategory::Cut => "cut",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "msm" => Some(ProductCategory::Msm),
            "offal" => Some(ProductCategory::Offal),
            "whole" => Some(ProductCategory::Whole),
            "cut" => Some(ProductCategory::Cut),
            _ => None,
        }
    }

    /// Shelf life in days. Months are counted as 30 flat days; every
    /// best-before date already on record was computed this way, so this
    /// must never be switched to calendar month arithmetic.
    pub fn shelf_life_days(&self) -> i64 {
        match self {
            ProductCategory::Msm => 30 * 12,
            ProductCategory::Offal => 30 * 9,
            ProductCategory::Whole | ProductCategory::Cut => 30 * 18,
        }
    }
}
