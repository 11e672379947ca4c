//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod bookmaker;
pub mod commission_history;
pub mod country;
pub mod employee;
pub mod operation_history;
pub mod report;
pub mod report_employee;
pub mod source;
pub mod sports_match;
pub mod template;
pub mod transfer;
pub mod wallet;

// Re-export specific types to avoid conflicts
pub use bookmaker::{Column as BookmakerColumn, Entity as Bookmaker, Model as BookmakerModel};
pub use commission_history::{
    Column as CommissionHistoryColumn, Entity as CommissionHistory, Model as CommissionHistoryModel,
};
pub use country::{Column as CountryColumn, Entity as Country, Model as CountryModel};
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use operation_history::{
    Column as OperationHistoryColumn, Entity as OperationHistory, Model as OperationHistoryModel,
};
pub use report::{Column as ReportColumn, Entity as Report, Model as ReportModel};
pub use report_employee::{
    Column as ReportEmployeeColumn, Entity as ReportEmployee, Model as ReportEmployeeModel,
};
pub use source::{Column as SourceColumn, Entity as Source, Model as SourceModel};
pub use sports_match::{
    Column as SportsMatchColumn, Entity as SportsMatch, Model as SportsMatchModel,
};
pub use template::{Column as TemplateColumn, Entity as Template, Model as TemplateModel};
pub use transfer::{Column as TransferColumn, Entity as Transfer, Model as TransferModel};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
