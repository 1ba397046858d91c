//! Customer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer receiving or supplying frozen goods
///
/// The registry fields (rc, cnss, patente, ice) carry the Moroccan fiscal
/// identifiers printed on customer sheets and keep their administrative
/// names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    /// Company or trade name; unique across the system
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub gsm: Option<String>,
    /// Registre de commerce
    pub rc: Option<String>,
    /// Social security registration
    pub cnss: Option<String>,
    /// Business license number
    pub patente: Option<String>,
    /// Identifiant commun de l'entreprise
    pub ice: Option<String>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}
