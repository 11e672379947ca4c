//! OperationHistory entity - Append-only audit trail of ledger mutations.
//!
//! Side channel only: never read by balance math. Every transfer and every
//! admin mutation appends one entry so the operation log can be reviewed and
//! exported alongside the commission trail.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operation audit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_history")]
pub struct Model {
    /// Unique identifier for the audit entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the operation happened
    pub date: DateTimeUtc,
    /// Who performed the operation, empty when unattributed
    pub actor: String,
    /// Operation kind, e.g. "create_transfer" or "delete_wallet"
    pub action: String,
    /// Human description of what the operation touched
    pub details: String,
}

/// Defines relationships between OperationHistory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
