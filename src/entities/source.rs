//! Source entity - A referral channel reports are attributed to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Source database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sources")]
pub struct Model {
    /// Unique identifier for the source
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Channel name
    pub name: String,
    /// Soft delete flag
    pub is_deleted: bool,
}

/// Defines relationships between Source and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One source has many reports
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
