//! Template entity - A bookmaker-profile preset: brand name plus the default
//! salary percentage new profiles inherit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Bookmaker brand name the template stands for
    pub name: String,
    /// Default salary percentage inherited by profiles
    pub salary_percentage: f64,
    /// Owning country, None for a general template
    pub country_id: Option<i64>,
    /// Soft delete flag
    pub is_deleted: bool,
}

/// Defines relationships between Template and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each template belongs to at most one country
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    /// One template spawns many profiles
    #[sea_orm(has_many = "super::bookmaker::Entity")]
    Bookmakers,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::bookmaker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmakers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
