//! Database configuration module for `StakeLedger`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    Bookmaker, CommissionHistory, Country, Employee, OperationHistory, Report, ReportEmployee,
    Source, SportsMatch, Template, Transfer, Wallet,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/stakeledger.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = [
        schema.create_table_from_entity(Country),
        schema.create_table_from_entity(Template),
        schema.create_table_from_entity(Wallet),
        schema.create_table_from_entity(Bookmaker),
        schema.create_table_from_entity(Employee),
        schema.create_table_from_entity(Source),
        schema.create_table_from_entity(SportsMatch),
        schema.create_table_from_entity(Report),
        schema.create_table_from_entity(ReportEmployee),
        schema.create_table_from_entity(Transfer),
        schema.create_table_from_entity(CommissionHistory),
        schema.create_table_from_entity(OperationHistory),
    ];
    for statement in &mut statements {
        db.execute(builder.build(statement.if_not_exists())).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ReportModel, TransferModel, WalletModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<WalletModel> = Wallet::find().limit(1).all(&db).await?;
        let _: Vec<ReportModel> = Report::find().limit(1).all(&db).await?;
        let _: Vec<TransferModel> = Transfer::find().limit(1).all(&db).await?;

        Ok(())
    }
}
