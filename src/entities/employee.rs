//! Employee entity - A bettor on payroll.
//!
//! No balance field on purpose: the owed amount is always derived from the
//! confirmed reports the employee participated in, plus `adjustment`, which
//! payout operations move to bring the derived balance to zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Messenger handle, if known
    pub username: Option<String>,
    /// Payroll correction; payouts subtract the derived balance from it
    pub adjustment: f64,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee appears on many report association rows
    #[sea_orm(has_many = "super::report_employee::Entity")]
    ReportEmployees,
}

impl Related<super::report_employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportEmployees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
