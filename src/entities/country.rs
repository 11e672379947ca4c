//! Country entity - Groups wallets, bookmaker profiles, reports, and templates.
//!
//! A country never stores a balance; both its figures (operational and active)
//! are folded from the accounts it owns. Hard removal is gated on a near-zero
//! active balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Country database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "countries")]
pub struct Model {
    /// Unique identifier for the country
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable country name
    pub name: String,
    /// Emoji flag shown in listings
    pub flag: String,
    /// Soft delete flag - if true, country is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Country and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One country has many bookmaker profiles
    #[sea_orm(has_many = "super::bookmaker::Entity")]
    Bookmakers,
    /// One country has many wallets
    #[sea_orm(has_many = "super::wallet::Entity")]
    Wallets,
    /// One country owns many reports
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
    /// One country owns many bookmaker templates
    #[sea_orm(has_many = "super::template::Entity")]
    Templates,
}

impl Related<super::bookmaker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmakers.def()
    }
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl Related<super::template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
