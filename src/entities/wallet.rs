//! Wallet entity - A money store on our side of the business.
//!
//! The stored `deposit` is only the opening amount; the current balance is
//! always derived from the transfer log plus the manual `adjustment`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable wallet name
    pub name: String,
    /// Free-form kind label ("general", "country", payment system name)
    pub wallet_kind: String,
    /// Opening amount the wallet was created with
    pub deposit: f64,
    /// Manual correction applied on top of the derived transfer sum
    pub adjustment: f64,
    /// Owning country, None for a general wallet
    pub country_id: Option<i64>,
    /// Soft delete flag - excluded from all balance and listing queries
    pub is_deleted: bool,
}

/// Defines relationships between Wallet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each wallet belongs to at most one country
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
