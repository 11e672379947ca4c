//! ReportEmployee entity - Ordered many-to-many association between reports
//! and employees.
//!
//! `sequence` makes the ordering explicit instead of relying on insertion
//! order: salary shares split across all rows of a report, while the penalty
//! of an erroneous loss lands entirely on the row with `sequence = 0`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report-to-employee association database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_employees")]
pub struct Model {
    /// Unique identifier for the association row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Report this row belongs to
    pub report_id: i64,
    /// Participating employee
    pub employee_id: i64,
    /// Position within the report's employee list; 0 is first-listed
    pub sequence: i32,
}

/// Defines relationships between ReportEmployee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one report
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id"
    )]
    Report,
    /// Each row names one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
