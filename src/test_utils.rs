//! Shared test utilities for `StakeLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{accounts, payroll, report},
    entities,
    errors::Result,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test country with an empty flag.
pub async fn create_test_country(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::country::Model> {
    accounts::create_country(db, name.to_string(), String::new()).await
}

/// Creates a test wallet of the "general" kind with the given opening
/// deposit.
pub async fn create_test_wallet(
    db: &DatabaseConnection,
    name: &str,
    deposit: f64,
    country_id: Option<i64>,
) -> Result<entities::wallet::Model> {
    accounts::create_wallet(
        db,
        name.to_string(),
        "general".to_string(),
        deposit,
        country_id,
    )
    .await
}

/// Creates a test bookmaker profile without a template.
///
/// # Defaults
/// * `bk_name`: "TestBook"
pub async fn create_test_bookmaker(
    db: &DatabaseConnection,
    name: &str,
    salary_percentage: f64,
    country_id: Option<i64>,
) -> Result<entities::bookmaker::Model> {
    accounts::create_bookmaker(
        db,
        name.to_string(),
        "TestBook".to_string(),
        salary_percentage,
        country_id,
    )
    .await
}

/// Creates a test employee whose username matches their name.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::employee::Model> {
    payroll::create_employee(db, name.to_string(), Some(name.to_string())).await
}

/// Creates a test report with an explicit settled payout.
///
/// # Defaults
/// * `coefficient`: 1.8
pub async fn create_test_report(
    db: &DatabaseConnection,
    bookmaker_id: i64,
    employee_ids: &[i64],
    bet_amount: f64,
    return_amount: f64,
) -> Result<entities::report::Model> {
    report::create_report(
        db,
        report::NewReport {
            bookmaker_id,
            employee_ids: employee_ids.to_vec(),
            bet_amount,
            coefficient: 1.8,
            return_amount: Some(return_amount),
            ..Default::default()
        },
    )
    .await
}

/// Pushes a report through admin confirmation so it counts toward balances
/// and payroll.
pub async fn admin_confirm_test_report(
    db: &DatabaseConnection,
    report_id: i64,
) -> Result<entities::report::Model> {
    report::admin_confirm_report(db, report_id).await
}

/// Soft-deletes a report and backdates the deletion stamp by `days` days,
/// for retention-purge tests.
pub async fn backdate_deleted_report(
    db: &DatabaseConnection,
    report_id: i64,
    days: i64,
) -> Result<entities::report::Model> {
    let deleted = report::soft_delete_report(db, report_id).await?;
    let mut active: entities::report::ActiveModel = deleted.into();
    active.deleted_at = Set(Some(Utc::now() - Duration::days(days)));
    Ok(active.update(db).await?)
}

/// Deactivates a bookmaker profile and backdates the deactivation stamp by
/// `days` days, for archival-sweep tests.
pub async fn backdate_deactivation(
    db: &DatabaseConnection,
    bookmaker_id: i64,
    days: i64,
) -> Result<entities::bookmaker::Model> {
    let deactivated = crate::core::lifecycle::deactivate_bookmaker(db, bookmaker_id).await?;
    let mut active: entities::bookmaker::ActiveModel = deactivated.into();
    active.deactivated_at = Set(Some(Utc::now() - Duration::days(days)));
    Ok(active.update(db).await?)
}

/// Builds an in-memory report model for pure-function tests, with the given
/// stake and payout and every flag cleared.
#[must_use]
pub fn report_fixture(bet_amount: f64, return_amount: f64) -> entities::report::Model {
    entities::report::Model {
        id: 1,
        date: Utc::now(),
        bookmaker_id: 1,
        country_id: None,
        source_id: None,
        match_id: None,
        bet_amount,
        return_amount,
        coefficient: if bet_amount > 0.0 {
            return_amount / bet_amount
        } else {
            1.0
        },
        salary_percentage_override: None,
        is_error: false,
        is_over: false,
        is_express: false,
        is_employee_checked: true,
        is_admin_checked: true,
        is_deleted: false,
        deleted_at: None,
    }
}
