//! The bet-report workflow - creation, settlement, double confirmation.
//!
//! A report moves through three states: open (just placed, payout assumed
//! optimistically), employee-checked (the bettor settled the outcome), and
//! admin-checked (reviewed; from here it counts toward balances and payroll).
//! Salary and penalty math lives here as pure functions so balance and
//! payroll derivations share one definition.

use crate::{
    core::{accounts, transfer::record_operation},
    entities::{
        Bookmaker, Employee, Report, ReportEmployee, Source, SportsMatch, bookmaker, employee,
        report, report_employee, source, sports_match,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

/// Penalty multiplier applied to erroneous losing bets.
pub const ERROR_PENALTY_MULTIPLIER: f64 = 3.0;

/// Whether a report counts toward balances and payroll.
#[must_use]
pub fn is_confirmed(report: &report::Model) -> bool {
    report.is_admin_checked && !report.is_deleted
}

/// Raw profit of a bet: what came back minus what was staked.
#[must_use]
pub fn profit(report: &report::Model) -> f64 {
    report.return_amount - report.bet_amount
}

/// The salary percentage governing a report: its own override when set,
/// otherwise the profile default.
#[must_use]
pub fn effective_salary_pct(report: &report::Model, bookmaker: Option<&bookmaker::Model>) -> f64 {
    report
        .salary_percentage_override
        .or_else(|| bookmaker.map(|b| b.salary_percentage))
        .unwrap_or(0.0)
}

/// Salary earned on a report. Erroneous bets earn nothing.
#[must_use]
pub fn salary(report: &report::Model, pct: f64) -> f64 {
    if report.is_error {
        0.0
    } else {
        report.bet_amount * pct / 100.0
    }
}

/// Penalty owed on a report: triple the salary rate on the absolute loss,
/// charged only when an erroneous bet lost money.
#[must_use]
pub fn penalty(report: &report::Model, pct: f64) -> f64 {
    let p = profit(report);
    if report.is_error && p < 0.0 {
        p.abs() * ERROR_PENALTY_MULTIPLIER * pct / 100.0
    } else {
        0.0
    }
}

/// Net amount owed to the report's employees: salary minus penalty.
#[must_use]
pub fn real_salary(report: &report::Model, pct: f64) -> f64 {
    salary(report, pct) - penalty(report, pct)
}

/// Profit a confirmed report contributes to its bookmaker's balance. Salary
/// payouts move money through transfers, so the contribution is the raw
/// profit unchanged.
#[must_use]
pub fn real_profit(report: &report::Model) -> f64 {
    profit(report)
}

/// Outcome an employee settles a report with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportResult {
    /// Bet won; payout is stake times coefficient
    Win,
    /// Bet lost; nothing came back
    Lose,
    /// Bet was voided or cashed out for the given amount
    Return(f64),
}

/// Parameters for [`create_report`].
#[derive(Debug, Clone)]
pub struct NewReport {
    pub bookmaker_id: i64,
    /// Participating employees in listing order; the first one carries any
    /// penalty
    pub employee_ids: Vec<i64>,
    pub bet_amount: f64,
    pub coefficient: f64,
    /// Settled payout; None assumes an optimistic win until settlement
    pub return_amount: Option<f64>,
    pub source_id: Option<i64>,
    pub match_id: Option<String>,
    pub salary_percentage_override: Option<f64>,
    pub is_express: bool,
}

impl Default for NewReport {
    fn default() -> Self {
        Self {
            bookmaker_id: 0,
            employee_ids: Vec::new(),
            bet_amount: 0.0,
            coefficient: 1.0,
            return_amount: None,
            source_id: None,
            match_id: None,
            salary_percentage_override: None,
            is_express: false,
        }
    }
}

/// Scalar and membership changes applied by [`edit_report`]. `None` fields
/// are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EditReport {
    pub bet_amount: Option<f64>,
    pub coefficient: Option<f64>,
    pub return_amount: Option<f64>,
    pub salary_percentage_override: Option<f64>,
    pub is_error: Option<bool>,
    pub is_over: Option<bool>,
    pub is_express: Option<bool>,
    /// Replaces the whole employee list, re-sequenced in the given order
    pub employee_ids: Option<Vec<i64>>,
}

async fn require_employees<C>(db: &C, employee_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    if employee_ids.is_empty() {
        return Err(Error::PolicyViolation {
            reason: "A report needs at least one employee".to_string(),
        });
    }
    for &id in employee_ids {
        Employee::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("employee", id))?;
    }
    Ok(())
}

async fn replace_report_employees<C>(db: &C, report_id: i64, employee_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    ReportEmployee::delete_many()
        .filter(report_employee::Column::ReportId.eq(report_id))
        .exec(db)
        .await?;

    for (sequence, &employee_id) in employee_ids.iter().enumerate() {
        report_employee::ActiveModel {
            report_id: Set(report_id),
            employee_id: Set(employee_id),
            sequence: Set(i32::try_from(sequence).unwrap_or(i32::MAX)),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Creates a new, unconfirmed report.
///
/// When no settled payout is given, the payout is assumed optimistically as
/// stake times coefficient until the employee settles the outcome. The report
/// row and its ordered employee rows are written in one transaction.
pub async fn create_report(db: &DatabaseConnection, new: NewReport) -> Result<report::Model> {
    if !new.bet_amount.is_finite() || new.bet_amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.bet_amount,
        });
    }
    if !new.coefficient.is_finite() || new.coefficient <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.coefficient,
        });
    }
    if let Some(amount) = new.return_amount
        && (!amount.is_finite() || amount < 0.0)
    {
        return Err(Error::InvalidAmount { amount });
    }

    let bookmaker = accounts::get_bookmaker_by_id(db, new.bookmaker_id)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", new.bookmaker_id))?;
    require_employees(db, &new.employee_ids).await?;

    let return_amount = new
        .return_amount
        .unwrap_or(new.bet_amount * new.coefficient);

    let txn = db.begin().await?;

    let report = report::ActiveModel {
        date: Set(Utc::now()),
        bookmaker_id: Set(bookmaker.id),
        country_id: Set(bookmaker.country_id),
        source_id: Set(new.source_id),
        match_id: Set(new.match_id),
        bet_amount: Set(new.bet_amount),
        return_amount: Set(return_amount),
        coefficient: Set(new.coefficient),
        salary_percentage_override: Set(new.salary_percentage_override),
        is_error: Set(false),
        is_over: Set(false),
        is_express: Set(new.is_express),
        is_employee_checked: Set(false),
        is_admin_checked: Set(false),
        is_deleted: Set(false),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    replace_report_employees(&txn, report.id, &new.employee_ids).await?;

    txn.commit().await?;

    info!(
        report_id = report.id,
        bookmaker_id = report.bookmaker_id,
        bet_amount = report.bet_amount,
        "Created report"
    );

    Ok(report)
}

/// A report as parsed from an automated submission (bet-slip screenshot or
/// forwarded message), with every participant still given by name.
#[derive(Debug, Clone)]
pub struct ParsedReport {
    /// Login name of an active bookmaker profile
    pub bookmaker_name: String,
    /// Employee name or messenger handle of the submitter
    pub employee_name: String,
    pub bet_amount: f64,
    pub coefficient: f64,
    pub match_name: Option<String>,
    pub is_express: bool,
}

/// Ingests an automatically parsed report: resolves the bookmaker profile
/// and employee by name, registers the match if one was named, and creates
/// an unconfirmed report for the submitting employee.
pub async fn ingest_parsed_report(
    db: &DatabaseConnection,
    parsed: ParsedReport,
) -> Result<report::Model> {
    let bookmaker = Bookmaker::find()
        .filter(bookmaker::Column::Name.eq(parsed.bookmaker_name.as_str()))
        .filter(bookmaker::Column::IsActive.eq(true))
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", parsed.bookmaker_name.clone()))?;

    let employee = Employee::find()
        .filter(
            Condition::any()
                .add(employee::Column::Name.eq(parsed.employee_name.as_str()))
                .add(employee::Column::Username.eq(parsed.employee_name.as_str())),
        )
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("employee", parsed.employee_name.clone()))?;

    let match_id = match parsed.match_name {
        Some(name) => Some(get_or_create_match(db, &name).await?.id),
        None => None,
    };

    create_report(
        db,
        NewReport {
            bookmaker_id: bookmaker.id,
            employee_ids: vec![employee.id],
            bet_amount: parsed.bet_amount,
            coefficient: parsed.coefficient,
            match_id,
            is_express: parsed.is_express,
            ..Default::default()
        },
    )
    .await
}

/// Finds a report by id, deleted ones included.
pub async fn get_report_by_id<C>(db: &C, report_id: i64) -> Result<Option<report::Model>>
where
    C: ConnectionTrait,
{
    Report::find_by_id(report_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The employee association rows of a report in listing order.
pub async fn report_employees_ordered<C>(
    db: &C,
    report_id: i64,
) -> Result<Vec<report_employee::Model>>
where
    C: ConnectionTrait,
{
    ReportEmployee::find()
        .filter(report_employee::Column::ReportId.eq(report_id))
        .order_by_asc(report_employee::Column::Sequence)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Edits an unsettled report.
///
/// Locked once the employee has settled it; from then on only the
/// confirmation flow may change it.
pub async fn edit_report(
    db: &DatabaseConnection,
    report_id: i64,
    edit: EditReport,
) -> Result<report::Model> {
    let report = get_report_by_id(db, report_id)
        .await?
        .filter(|r| !r.is_deleted)
        .ok_or_else(|| Error::not_found("report", report_id))?;

    if report.is_employee_checked {
        return Err(Error::PolicyViolation {
            reason: format!("Report {report_id} is already settled and cannot be edited"),
        });
    }

    for amount in [edit.bet_amount, edit.return_amount] {
        if let Some(amount) = amount
            && (!amount.is_finite() || amount < 0.0)
        {
            return Err(Error::InvalidAmount { amount });
        }
    }
    if let Some(coefficient) = edit.coefficient
        && (!coefficient.is_finite() || coefficient <= 0.0)
    {
        return Err(Error::InvalidAmount {
            amount: coefficient,
        });
    }
    if let Some(ids) = &edit.employee_ids {
        require_employees(db, ids).await?;
    }

    let txn = db.begin().await?;

    let mut active: report::ActiveModel = report.into();
    if let Some(v) = edit.bet_amount {
        active.bet_amount = Set(v);
    }
    if let Some(v) = edit.coefficient {
        active.coefficient = Set(v);
    }
    if let Some(v) = edit.return_amount {
        active.return_amount = Set(v);
    }
    if let Some(v) = edit.salary_percentage_override {
        active.salary_percentage_override = Set(Some(v));
    }
    if let Some(v) = edit.is_error {
        active.is_error = Set(v);
    }
    if let Some(v) = edit.is_over {
        active.is_over = Set(v);
    }
    if let Some(v) = edit.is_express {
        active.is_express = Set(v);
    }
    let updated = active.update(&txn).await?;

    if let Some(ids) = &edit.employee_ids {
        replace_report_employees(&txn, report_id, ids).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

/// Settles a report with its outcome on the employee's behalf.
///
/// Sets the payout from the result and marks the report employee-checked.
pub async fn confirm_report(
    db: &DatabaseConnection,
    report_id: i64,
    result: ReportResult,
) -> Result<report::Model> {
    let report = get_report_by_id(db, report_id)
        .await?
        .filter(|r| !r.is_deleted)
        .ok_or_else(|| Error::not_found("report", report_id))?;

    let return_amount = match result {
        ReportResult::Win => report.bet_amount * report.coefficient,
        ReportResult::Lose => 0.0,
        ReportResult::Return(amount) => {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
            amount
        }
    };

    let mut active: report::ActiveModel = report.into();
    active.return_amount = Set(return_amount);
    active.is_employee_checked = Set(true);
    let updated = active.update(db).await?;

    info!(
        report_id = updated.id,
        return_amount = updated.return_amount,
        "Report settled by employee"
    );
    Ok(updated)
}

/// Admin review of a settled report. From here the report counts toward
/// balances, payroll, and statistics.
pub async fn admin_confirm_report(
    db: &DatabaseConnection,
    report_id: i64,
) -> Result<report::Model> {
    let report = get_report_by_id(db, report_id)
        .await?
        .filter(|r| !r.is_deleted)
        .ok_or_else(|| Error::not_found("report", report_id))?;

    let txn = db.begin().await?;
    let mut active: report::ActiveModel = report.into();
    active.is_employee_checked = Set(true);
    active.is_admin_checked = Set(true);
    let updated = active.update(&txn).await?;
    record_operation(
        &txn,
        "",
        "confirm_report",
        &format!("Admin-confirmed report {}", updated.id),
    )
    .await?;
    txn.commit().await?;

    info!(report_id = updated.id, "Report confirmed by admin");
    Ok(updated)
}

/// Retraction by the submitting employee.
///
/// Only a participant may retract, and only while the report is still open.
/// Once settled, corrections go through the admin delete instead.
pub async fn retract_report(
    db: &DatabaseConnection,
    report_id: i64,
    employee_id: i64,
) -> Result<report::Model> {
    let report = get_report_by_id(db, report_id)
        .await?
        .filter(|r| !r.is_deleted)
        .ok_or_else(|| Error::not_found("report", report_id))?;

    if report.is_employee_checked {
        return Err(Error::PolicyViolation {
            reason: format!("Report {report_id} is already settled and cannot be retracted"),
        });
    }
    let participants = report_employees_ordered(db, report_id).await?;
    if !participants.iter().any(|p| p.employee_id == employee_id) {
        return Err(Error::PolicyViolation {
            reason: format!("Employee {employee_id} is not on report {report_id}"),
        });
    }

    soft_delete_report(db, report_id).await
}

/// Soft-deletes a report (admin operation), stamping `deleted_at` so the
/// retention purge can pick it up later. Idempotent.
pub async fn soft_delete_report(db: &DatabaseConnection, report_id: i64) -> Result<report::Model> {
    let report = get_report_by_id(db, report_id)
        .await?
        .ok_or_else(|| Error::not_found("report", report_id))?;

    if report.is_deleted {
        return Ok(report);
    }

    let txn = db.begin().await?;
    let mut active: report::ActiveModel = report.into();
    active.is_deleted = Set(true);
    active.deleted_at = Set(Some(Utc::now()));
    let deleted = active.update(&txn).await?;
    record_operation(
        &txn,
        "",
        "delete_report",
        &format!("Soft-deleted report {}", deleted.id),
    )
    .await?;
    txn.commit().await?;

    info!(report_id = deleted.id, "Soft-deleted report");
    Ok(deleted)
}

/// Finds a match by event name or registers a new active one. The event name
/// doubles as the identifier.
pub async fn get_or_create_match<C>(db: &C, name: &str) -> Result<sports_match::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = SportsMatch::find_by_id(name.to_string()).one(db).await? {
        return Ok(existing);
    }

    sports_match::ActiveModel {
        id: Set(name.to_string()),
        name: Set(name.to_string()),
        canonical_id: Set(None),
        is_active: Set(true),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Links one match as an alias of a canonical match, so match-wide operations
/// cover both spellings of the same event.
pub async fn alias_match(
    db: &DatabaseConnection,
    alias_id: &str,
    canonical_id: &str,
) -> Result<sports_match::Model> {
    SportsMatch::find_by_id(canonical_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("match", canonical_id))?;
    let alias = SportsMatch::find_by_id(alias_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("match", alias_id))?;

    let mut active: sports_match::ActiveModel = alias.into();
    active.canonical_id = Set(Some(canonical_id.to_string()));
    Ok(active.update(db).await?)
}

/// Admin-confirms every settled report grouped under a match, alias children
/// included. Returns the number of reports confirmed.
pub async fn admin_confirm_match(db: &DatabaseConnection, match_id: &str) -> Result<u64> {
    SportsMatch::find_by_id(match_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("match", match_id))?;

    let mut match_ids = vec![match_id.to_string()];
    let children = SportsMatch::find()
        .filter(sports_match::Column::CanonicalId.eq(match_id))
        .all(db)
        .await?;
    match_ids.extend(children.into_iter().map(|m| m.id));

    let result = Report::update_many()
        .col_expr(report::Column::IsAdminChecked, Expr::value(true))
        .filter(report::Column::MatchId.is_in(match_ids))
        .filter(report::Column::IsEmployeeChecked.eq(true))
        .filter(report::Column::IsDeleted.eq(false))
        .exec(db)
        .await?;

    info!(
        match_id,
        confirmed = result.rows_affected,
        "Confirmed reports by match"
    );
    Ok(result.rows_affected)
}

/// Registers a referral source.
pub async fn create_source(db: &DatabaseConnection, name: String) -> Result<source::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Source name cannot be empty".to_string(),
        });
    }

    source::ActiveModel {
        name: Set(name.trim().to_string()),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves all active referral sources.
pub async fn get_sources(db: &DatabaseConnection) -> Result<Vec<source::Model>> {
    Source::find()
        .filter(source::Column::IsDeleted.eq(false))
        .order_by_asc(source::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Soft-deletes a referral source. Reports keep their attribution.
pub async fn soft_delete_source(db: &DatabaseConnection, source_id: i64) -> Result<source::Model> {
    let source = Source::find_by_id(source_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("source", source_id))?;

    if source.is_deleted {
        return Ok(source);
    }

    let mut active: source::ActiveModel = source.into();
    active.is_deleted = Set(true);
    Ok(active.update(db).await?)
}
