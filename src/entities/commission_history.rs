//! CommissionHistory entity - Append-only audit trail of transfer commissions.
//!
//! Side channel only: never read by balance math, written once per successful
//! transfer for traceability.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Commission audit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_history")]
pub struct Model {
    /// Unique identifier for the audit entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the commission was recorded
    pub date: DateTimeUtc,
    /// Who initiated the transfer
    pub actor: String,
    /// Commission amount; negative for a rebate
    pub commission: f64,
    /// Flow classification of the originating transfer: "internal",
    /// "deposit", or "withdrawal"
    pub direction: String,
    /// Human description of the movement
    pub description: String,
}

/// Defines relationships between CommissionHistory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
