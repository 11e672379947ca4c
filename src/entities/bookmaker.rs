//! Bookmaker entity - A profile (login) held at a bookmaker brand.
//!
//! Tracks two independent sub-ledgers ("deposit" and "balance"), both derived
//! from the transfer log; the balance side additionally accumulates the profit
//! of confirmed reports. `salary_percentage` is the default rate for reports
//! placed through this profile unless a report carries its own override.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bookmaker profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookmakers")]
pub struct Model {
    /// Unique identifier for the profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile login name
    pub name: String,
    /// Bookmaker brand name (e.g. "Bet365")
    pub bk_name: String,
    /// Default salary percentage for reports on this profile
    pub salary_percentage: f64,
    /// Owning country, None for a general profile
    pub country_id: Option<i64>,
    /// Template this profile was created from, if any
    pub template_id: Option<i64>,
    /// Whether the profile is operationally active
    pub is_active: bool,
    /// When the profile was deactivated, None while active
    pub deactivated_at: Option<DateTimeUtc>,
    /// Soft delete flag - excluded from all balance and listing queries
    pub is_deleted: bool,
}

/// Defines relationships between Bookmaker and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each profile belongs to at most one country
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    /// Each profile may originate from a template
    #[sea_orm(
        belongs_to = "super::template::Entity",
        from = "Column::TemplateId",
        to = "super::template::Column::Id"
    )]
    Template,
    /// One profile has many reports
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
