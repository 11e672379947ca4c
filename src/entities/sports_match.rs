//! Match entity - An optional grouping key for reports placed on the same
//! sporting event. A match may alias to a canonical match via `canonical_id`;
//! match-wide operations cover the canonical match and its alias children.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Match database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    /// External string identifier for the match
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Event name
    pub name: String,
    /// Canonical match this one aliases to, None if it is canonical itself
    pub canonical_id: Option<String>,
    /// Whether the match is still open for report grouping
    pub is_active: bool,
}

/// Defines relationships between Match and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One match groups many reports
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
