//! Report entity - One placed (and eventually settled) bet.
//!
//! A report feeds balances and payroll only once it passes the double
//! confirmation gate: the employee settles the outcome
//! (`is_employee_checked`), then an admin reviews it (`is_admin_checked`).
//! Profit, salary, and penalty are derived in `core::report`, never stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    /// Unique identifier for the report
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the bet was placed
    pub date: DateTimeUtc,
    /// Profile the bet was placed through
    pub bookmaker_id: i64,
    /// Country the bet is attributed to
    pub country_id: Option<i64>,
    /// Referral channel
    pub source_id: Option<i64>,
    /// Optional match grouping key
    pub match_id: Option<String>,
    /// Stake placed
    pub bet_amount: f64,
    /// Amount returned on settlement (0 until settled)
    pub return_amount: f64,
    /// Odds the bet was placed at
    pub coefficient: f64,
    /// Per-report salary percentage; None falls back to the bookmaker default
    pub salary_percentage_override: Option<f64>,
    /// Marked erroneous by an admin; erroneous losses incur a penalty
    pub is_error: bool,
    /// Stake exceeded the allowed amount
    pub is_over: bool,
    /// Express (accumulator) bet
    pub is_express: bool,
    /// Employee confirmed the settlement outcome
    pub is_employee_checked: bool,
    /// Admin reviewed the report; only then does it count anywhere
    pub is_admin_checked: bool,
    /// Soft delete flag
    pub is_deleted: bool,
    /// When the report was soft-deleted, drives the retention purge
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Report and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each report belongs to one bookmaker profile
    #[sea_orm(
        belongs_to = "super::bookmaker::Entity",
        from = "Column::BookmakerId",
        to = "super::bookmaker::Column::Id"
    )]
    Bookmaker,
    /// Each report is attributed to at most one country
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    /// Each report is attributed to at most one source
    #[sea_orm(
        belongs_to = "super::source::Entity",
        from = "Column::SourceId",
        to = "super::source::Column::Id"
    )]
    Source,
    /// Each report may group under one match
    #[sea_orm(
        belongs_to = "super::sports_match::Entity",
        from = "Column::MatchId",
        to = "super::sports_match::Column::Id"
    )]
    SportsMatch,
    /// One report has many ordered employee association rows
    #[sea_orm(has_many = "super::report_employee::Entity")]
    ReportEmployees,
}

impl Related<super::bookmaker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmaker.def()
    }
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Source.def()
    }
}

impl Related<super::sports_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SportsMatch.def()
    }
}

impl Related<super::report_employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportEmployees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
