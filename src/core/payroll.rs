//! Payroll - what each employee is owed, and how it gets paid out.
//!
//! An employee's balance is derived, never stored: the salary shares and
//! penalties of every confirmed report they participated in, plus a manual
//! adjustment. The salary of a report splits equally across its employees;
//! the penalty of an erroneous loss lands entirely on the first-listed one.
//! Paying out moves the adjustment so the derived balance returns to zero.

use crate::{
    core::{
        balance::CURRENCY_EPSILON,
        report::{effective_salary_pct, is_confirmed, penalty, salary},
        stats::Period,
        transfer::record_operation,
    },
    entities::{Bookmaker, Employee, Report, ReportEmployee, employee, report_employee},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::info;

/// Registers a new employee.
pub async fn create_employee(
    db: &DatabaseConnection,
    name: String,
    username: Option<String>,
) -> Result<employee::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Employee name cannot be empty".to_string(),
        });
    }

    let model = employee::ActiveModel {
        name: Set(name.trim().to_string()),
        username: Set(username),
        adjustment: Set(0.0),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Retrieves all employees, ordered alphabetically by name.
pub async fn get_employees(db: &DatabaseConnection) -> Result<Vec<employee::Model>> {
    Employee::find()
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an employee by id.
pub async fn get_employee_by_id<C>(db: &C, employee_id: i64) -> Result<Option<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// One confirmed report's contribution to an employee's balance.
#[derive(Debug, Clone)]
pub struct PayrollLine {
    pub report_id: i64,
    pub date: chrono::DateTime<chrono::Utc>,
    /// This employee's equal share of the report salary
    pub salary_share: f64,
    /// Penalty charged to this employee (first-listed only)
    pub penalty: f64,
}

impl PayrollLine {
    /// Net contribution of this line.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.salary_share - self.penalty
    }
}

/// Full payroll state of one employee.
#[derive(Debug, Clone)]
pub struct PayrollBreakdown {
    pub employee: employee::Model,
    pub lines: Vec<PayrollLine>,
    pub total_salary: f64,
    pub total_penalty: f64,
    /// Amount currently owed: adjustment plus the net of every line
    pub balance: f64,
}

async fn payroll_lines<C>(db: &C, employee_id: i64) -> Result<Vec<PayrollLine>>
where
    C: ConnectionTrait,
{
    let memberships = ReportEmployee::find()
        .filter(report_employee::Column::EmployeeId.eq(employee_id))
        .all(db)
        .await?;

    let mut lines = Vec::with_capacity(memberships.len());
    for membership in memberships {
        let Some(report) = Report::find_by_id(membership.report_id).one(db).await? else {
            continue;
        };
        if !is_confirmed(&report) {
            continue;
        }

        // The profile default still applies even if the profile was since
        // soft-deleted, so no is_deleted filter here.
        let bookmaker = Bookmaker::find_by_id(report.bookmaker_id).one(db).await?;
        let pct = effective_salary_pct(&report, bookmaker.as_ref());

        let participants = ReportEmployee::find()
            .filter(report_employee::Column::ReportId.eq(report.id))
            .count(db)
            .await?
            .max(1);

        #[allow(clippy::cast_precision_loss)]
        let salary_share = salary(&report, pct) / participants as f64;
        let penalty = if membership.sequence == 0 {
            penalty(&report, pct)
        } else {
            0.0
        };

        lines.push(PayrollLine {
            report_id: report.id,
            date: report.date,
            salary_share,
            penalty,
        });
    }
    Ok(lines)
}

/// Derives the full payroll breakdown of one employee.
pub async fn payroll_breakdown<C>(db: &C, employee_id: i64) -> Result<PayrollBreakdown>
where
    C: ConnectionTrait,
{
    let employee = get_employee_by_id(db, employee_id)
        .await?
        .ok_or_else(|| Error::not_found("employee", employee_id))?;

    let lines = payroll_lines(db, employee_id).await?;
    let total_salary: f64 = lines.iter().map(|l| l.salary_share).sum();
    let total_penalty: f64 = lines.iter().map(|l| l.penalty).sum();
    let balance = employee.adjustment + total_salary - total_penalty;

    Ok(PayrollBreakdown {
        employee,
        lines,
        total_salary,
        total_penalty,
        balance,
    })
}

/// Derives the amount currently owed to one employee.
pub async fn employee_balance<C>(db: &C, employee_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    Ok(payroll_breakdown(db, employee_id).await?.balance)
}

/// Pays out an employee's balance, returning the amount paid.
///
/// The payout moves the adjustment so the derived balance returns to zero.
/// The write is guarded against concurrent payroll changes: it only lands if
/// the adjustment still holds the value the balance was derived from, and
/// fails with `ConcurrencyConflict` otherwise so the caller can re-derive
/// and retry.
pub async fn pay_salary(db: &DatabaseConnection, employee_id: i64) -> Result<f64> {
    let breakdown = payroll_breakdown(db, employee_id).await?;
    if breakdown.balance.abs() < CURRENCY_EPSILON {
        return Ok(0.0);
    }

    let old_adjustment = breakdown.employee.adjustment;
    let new_adjustment = old_adjustment - breakdown.balance;

    let result = Employee::update_many()
        .col_expr(employee::Column::Adjustment, Expr::value(new_adjustment))
        .filter(employee::Column::Id.eq(employee_id))
        .filter(employee::Column::Adjustment.eq(old_adjustment))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ConcurrencyConflict {
            reason: format!("Payroll for employee {employee_id} changed during payout"),
        });
    }

    record_operation(
        db,
        "",
        "pay_salary",
        &format!(
            "Paid {:.2} to employee {employee_id}",
            breakdown.balance
        ),
    )
    .await?;

    info!(
        employee_id,
        paid = breakdown.balance,
        "Paid out employee balance"
    );
    Ok(breakdown.balance)
}

/// Applies a manual payroll correction by atomically adding to the
/// employee's adjustment.
pub async fn adjust_employee<C>(
    db: &C,
    employee_id: i64,
    delta: f64,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    if !delta.is_finite() {
        return Err(Error::InvalidAmount { amount: delta });
    }

    get_employee_by_id(db, employee_id)
        .await?
        .ok_or_else(|| Error::not_found("employee", employee_id))?;

    Employee::update_many()
        .col_expr(
            employee::Column::Adjustment,
            Expr::col(employee::Column::Adjustment).add(delta),
        )
        .filter(employee::Column::Id.eq(employee_id))
        .exec(db)
        .await?;

    get_employee_by_id(db, employee_id)
        .await?
        .ok_or_else(|| Error::not_found("employee", employee_id))
}

/// Per-employee salary totals over a period.
#[derive(Debug, Clone)]
pub struct EmployeeSalaryStats {
    pub employee: employee::Model,
    pub total_salary: f64,
    pub total_penalty: f64,
    pub net: f64,
}

/// Salary totals for every employee over the given period, derived from
/// confirmed reports dated within it.
pub async fn salary_stats(
    db: &DatabaseConnection,
    period: Period,
) -> Result<Vec<EmployeeSalaryStats>> {
    let employees = get_employees(db).await?;

    let mut stats = Vec::with_capacity(employees.len());
    for employee in employees {
        let lines = payroll_lines(db, employee.id).await?;
        let in_period: Vec<&PayrollLine> =
            lines.iter().filter(|l| period.contains(l.date)).collect();

        let total_salary: f64 = in_period.iter().map(|l| l.salary_share).sum();
        let total_penalty: f64 = in_period.iter().map(|l| l.penalty).sum();
        stats.push(EmployeeSalaryStats {
            employee,
            total_salary,
            total_penalty,
            net: total_salary - total_penalty,
        });
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::report::EditReport, test_utils::*};

    #[tokio::test]
    async fn test_salary_splits_equally() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let alice = create_test_employee(&db, "alice").await?;
        let bob = create_test_employee(&db, "bob").await?;

        let report =
            create_test_report(&db, bookmaker.id, &[alice.id, bob.id], 150.0, 300.0).await?;
        admin_confirm_test_report(&db, report.id).await?;

        assert_eq!(employee_balance(&db, alice.id).await?, 7.5);
        assert_eq!(employee_balance(&db, bob.id).await?, 7.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_penalty_lands_on_first_listed() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let alice = create_test_employee(&db, "alice").await?;
        let bob = create_test_employee(&db, "bob").await?;

        let report =
            create_test_report(&db, bookmaker.id, &[alice.id, bob.id], 100.0, 0.0).await?;
        crate::core::report::edit_report(
            &db,
            report.id,
            EditReport {
                is_error: Some(true),
                ..Default::default()
            },
        )
        .await?;
        admin_confirm_test_report(&db, report.id).await?;

        // Erroneous loss: no salary for anyone, triple-rate penalty on alice.
        assert_eq!(employee_balance(&db, alice.id).await?, -30.0);
        assert_eq!(employee_balance(&db, bob.id).await?, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_unconfirmed_reports_excluded() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let alice = create_test_employee(&db, "alice").await?;

        create_test_report(&db, bookmaker.id, &[alice.id], 100.0, 200.0).await?;

        assert_eq!(employee_balance(&db, alice.id).await?, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_pay_salary_zeroes_balance() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let alice = create_test_employee(&db, "alice").await?;

        let report = create_test_report(&db, bookmaker.id, &[alice.id], 100.0, 200.0).await?;
        admin_confirm_test_report(&db, report.id).await?;
        assert_eq!(employee_balance(&db, alice.id).await?, 10.0);

        let paid = pay_salary(&db, alice.id).await?;
        assert_eq!(paid, 10.0);
        assert!(employee_balance(&db, alice.id).await?.abs() < CURRENCY_EPSILON);

        // A second payout finds nothing owed.
        assert_eq!(pay_salary(&db, alice.id).await?, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_employee(&db, "alice").await?;

        adjust_employee(&db, alice.id, 25.0).await?;
        let updated = adjust_employee(&db, alice.id, -5.0).await?;
        assert_eq!(updated.adjustment, 20.0);
        assert_eq!(employee_balance(&db, alice.id).await?, 20.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_salary_stats_over_period() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let alice = create_test_employee(&db, "alice").await?;

        let report = create_test_report(&db, bookmaker.id, &[alice.id], 100.0, 200.0).await?;
        admin_confirm_test_report(&db, report.id).await?;

        let stats = salary_stats(&db, Period::all_time()).await?;
        let for_alice = stats.iter().find(|s| s.employee.id == alice.id).unwrap();
        assert_eq!(for_alice.total_salary, 10.0);
        assert_eq!(for_alice.net, 10.0);

        Ok(())
    }
}
