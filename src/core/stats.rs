//! Read-only statistics and export over the ledger.
//!
//! Everything here derives from the same confirmed-report gate as balances
//! and payroll, scoped to a half-open time period. Nothing in this module
//! writes.

use crate::{
    core::{
        accounts, balance,
        balance::CountryBalances,
        report::{effective_salary_pct, is_confirmed, penalty, profit, real_salary},
    },
    entities::{
        Bookmaker, Country, Employee, OperationHistory, Report, ReportEmployee, Source, bookmaker,
        country, employee, operation_history, report, report_employee, source, transfer,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::HashMap;

/// A half-open time window: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The whole ledger history.
    ///
    /// The endpoints stay within four-digit years: the store compares dates
    /// as text, and a year outside 0000..=9999 serializes with a sign prefix
    /// that breaks lexicographic ordering.
    #[must_use]
    pub fn all_time() -> Self {
        Self {
            start: DateTime::UNIX_EPOCH,
            end: DateTime::from_timestamp(253_402_300_799, 0).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// The trailing `days` up to now.
    #[must_use]
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

async fn confirmed_reports_in(db: &DatabaseConnection, period: Period) -> Result<Vec<report::Model>> {
    Ok(Report::find()
        .filter(report::Column::IsDeleted.eq(false))
        .filter(report::Column::IsAdminChecked.eq(true))
        .filter(report::Column::Date.gte(period.start))
        .filter(report::Column::Date.lt(period.end))
        .all(db)
        .await?)
}

async fn bookmakers_by_id(db: &DatabaseConnection) -> Result<HashMap<i64, bookmaker::Model>> {
    Ok(Bookmaker::find()
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect())
}

/// Ledger-wide totals over a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalStats {
    pub report_count: u64,
    pub bet_total: f64,
    pub return_total: f64,
    /// Raw profit before payroll
    pub profit: f64,
    /// Salary minus penalties owed for these reports
    pub salary_total: f64,
}

/// Derives ledger-wide totals from the confirmed reports of a period.
pub async fn total_stats(db: &DatabaseConnection, period: Period) -> Result<TotalStats> {
    let reports = confirmed_reports_in(db, period).await?;
    let profiles = bookmakers_by_id(db).await?;

    let mut stats = TotalStats {
        report_count: 0,
        bet_total: 0.0,
        return_total: 0.0,
        profit: 0.0,
        salary_total: 0.0,
    };
    for r in &reports {
        let pct = effective_salary_pct(r, profiles.get(&r.bookmaker_id));
        stats.report_count += 1;
        stats.bet_total += r.bet_amount;
        stats.return_total += r.return_amount;
        stats.profit += profit(r);
        stats.salary_total += real_salary(r, pct);
    }
    Ok(stats)
}

/// Per-country figures over a period.
#[derive(Debug, Clone)]
pub struct CountryStats {
    pub country: country::Model,
    /// Current balances, not scoped to the period
    pub balances: CountryBalances,
    pub report_count: u64,
    pub bet_total: f64,
    pub profit: f64,
    pub salary_total: f64,
    /// Money that arrived on the country's accounts via transfers in the
    /// period
    pub expenses: f64,
}

/// Derives the figures of one country over a period.
pub async fn country_stats(
    db: &DatabaseConnection,
    country_id: i64,
    period: Period,
) -> Result<CountryStats> {
    let country = accounts::get_country_by_id(db, country_id)
        .await?
        .ok_or_else(|| Error::not_found("country", country_id))?;
    let balances = balance::country_balances(db, country_id).await?;
    let profiles = bookmakers_by_id(db).await?;

    let reports = confirmed_reports_in(db, period).await?;
    let mut stats = CountryStats {
        country,
        balances,
        report_count: 0,
        bet_total: 0.0,
        profit: 0.0,
        salary_total: 0.0,
        expenses: 0.0,
    };
    for r in reports.iter().filter(|r| r.country_id == Some(country_id)) {
        let pct = effective_salary_pct(r, profiles.get(&r.bookmaker_id));
        stats.report_count += 1;
        stats.bet_total += r.bet_amount;
        stats.profit += profit(r);
        stats.salary_total += real_salary(r, pct);
    }

    let transfers = crate::entities::Transfer::find()
        .filter(transfer::Column::IsDeleted.eq(false))
        .filter(transfer::Column::CountryId.eq(country_id))
        .filter(transfer::Column::Timestamp.gte(period.start))
        .filter(transfer::Column::Timestamp.lt(period.end))
        .all(db)
        .await?;
    stats.expenses = transfers.iter().map(|t| t.amount_received).sum();

    Ok(stats)
}

/// Per-profile figures over a period.
#[derive(Debug, Clone)]
pub struct BookmakerStats {
    pub bookmaker: bookmaker::Model,
    /// Current overall balance, not scoped to the period
    pub balance: f64,
    /// Current deposit subledger, not scoped to the period
    pub deposit: f64,
    pub report_count: u64,
    pub bet_total: f64,
    pub return_total: f64,
    pub profit: f64,
}

/// Derives the figures of one bookmaker profile over a period.
pub async fn bookmaker_stats(
    db: &DatabaseConnection,
    bookmaker_id: i64,
    period: Period,
) -> Result<BookmakerStats> {
    let (bookmaker, transfers, all_reports) =
        balance::load_bookmaker_with_records(db, bookmaker_id).await?;
    let balance = balance::bookmaker_balance(&bookmaker, &transfers, &all_reports);
    let deposit = balance::bookmaker_deposit(&bookmaker, &transfers);

    let mut stats = BookmakerStats {
        bookmaker,
        balance,
        deposit,
        report_count: 0,
        bet_total: 0.0,
        return_total: 0.0,
        profit: 0.0,
    };
    for r in all_reports
        .iter()
        .filter(|r| is_confirmed(r) && period.contains(r.date))
    {
        stats.report_count += 1;
        stats.bet_total += r.bet_amount;
        stats.return_total += r.return_amount;
        stats.profit += profit(r);
    }
    Ok(stats)
}

/// Per-source figures over a period.
#[derive(Debug, Clone)]
pub struct SourceStats {
    pub source: source::Model,
    pub report_count: u64,
    pub bet_total: f64,
    pub profit: f64,
}

/// Derives the figures of every active referral source over a period.
pub async fn source_stats(db: &DatabaseConnection, period: Period) -> Result<Vec<SourceStats>> {
    let sources = Source::find()
        .filter(source::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let reports = confirmed_reports_in(db, period).await?;

    let mut stats: Vec<SourceStats> = sources
        .into_iter()
        .map(|source| SourceStats {
            source,
            report_count: 0,
            bet_total: 0.0,
            profit: 0.0,
        })
        .collect();
    for r in &reports {
        let Some(source_id) = r.source_id else {
            continue;
        };
        if let Some(entry) = stats.iter_mut().find(|s| s.source.id == source_id) {
            entry.report_count += 1;
            entry.bet_total += r.bet_amount;
            entry.profit += profit(r);
        }
    }
    Ok(stats)
}

/// The operation-log entries of a period, oldest first. Feeds the audit
/// spreadsheet export alongside [`export_rows`].
pub async fn operation_log(
    db: &DatabaseConnection,
    period: Period,
) -> Result<Vec<operation_history::Model>> {
    Ok(OperationHistory::find()
        .filter(operation_history::Column::Date.gte(period.start))
        .filter(operation_history::Column::Date.lt(period.end))
        .order_by_asc(operation_history::Column::Id)
        .all(db)
        .await?)
}

/// One row of a spreadsheet export.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportRow {
    pub report_id: i64,
    /// "confirmed", "settled", or "open"
    pub status: String,
    /// Employee the row is attributed to
    pub employee: String,
    pub date: DateTime<Utc>,
    pub bet_amount: f64,
    pub return_amount: f64,
    pub profit: f64,
    /// What the employee keeps: the salary share, or the penalty owed (as a
    /// negative number) on an erroneous loss
    pub payout: f64,
    pub source: Option<String>,
    pub country: Option<String>,
    pub bk_name: String,
    pub profile: String,
    pub match_name: Option<String>,
}

/// Options for [`export_rows`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Emit one row per participating employee, splitting the amounts
    pub split_per_employee: bool,
    /// Include reports that have not passed admin review yet
    pub include_unconfirmed: bool,
}

fn report_status(r: &report::Model) -> &'static str {
    if is_confirmed(r) {
        "confirmed"
    } else if r.is_employee_checked {
        "settled"
    } else {
        "open"
    }
}

/// Builds spreadsheet export rows for the reports of a period, newest first
/// in report order.
pub async fn export_rows(
    db: &DatabaseConnection,
    period: Period,
    options: ExportOptions,
) -> Result<Vec<ExportRow>> {
    let mut query = Report::find()
        .filter(report::Column::IsDeleted.eq(false))
        .filter(report::Column::Date.gte(period.start))
        .filter(report::Column::Date.lt(period.end));
    if !options.include_unconfirmed {
        query = query.filter(report::Column::IsAdminChecked.eq(true));
    }
    let reports = query.all(db).await?;

    let profiles = bookmakers_by_id(db).await?;
    let countries: HashMap<i64, country::Model> = Country::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let sources: HashMap<i64, source::Model> = Source::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let employees: HashMap<i64, employee::Model> = Employee::find()
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let mut rows = Vec::new();
    for r in &reports {
        let bookmaker = profiles.get(&r.bookmaker_id);
        let pct = effective_salary_pct(r, bookmaker);
        let mut participants = ReportEmployee::find()
            .filter(report_employee::Column::ReportId.eq(r.id))
            .all(db)
            .await?;
        participants.sort_by_key(|p| p.sequence);

        let employee_name = |id: i64| {
            employees
                .get(&id)
                .map_or_else(String::new, |e| e.username.clone().unwrap_or_else(|| e.name.clone()))
        };

        let base = ExportRow {
            report_id: r.id,
            status: report_status(r).to_string(),
            employee: participants
                .first()
                .map_or_else(String::new, |p| employee_name(p.employee_id)),
            date: r.date,
            bet_amount: r.bet_amount,
            return_amount: r.return_amount,
            profit: profit(r),
            payout: real_salary(r, pct),
            source: r
                .source_id
                .and_then(|id| sources.get(&id))
                .map(|s| s.name.clone()),
            country: r
                .country_id
                .and_then(|id| countries.get(&id))
                .map(|c| c.name.clone()),
            bk_name: bookmaker.map_or_else(String::new, |b| b.bk_name.clone()),
            profile: bookmaker.map_or_else(String::new, |b| b.name.clone()),
            match_name: r.match_id.clone(),
        };

        if options.split_per_employee && participants.len() > 1 {
            #[allow(clippy::cast_precision_loss)]
            let share = participants.len() as f64;
            for p in &participants {
                let mut row = base.clone();
                row.employee = employee_name(p.employee_id);
                row.bet_amount /= share;
                row.return_amount /= share;
                row.profit /= share;
                // Salary splits equally; the penalty stays with the
                // first-listed employee.
                row.payout = salary_share_for(r, pct, share, p.sequence);
                rows.push(row);
            }
        } else {
            rows.push(base);
        }
    }
    Ok(rows)
}

fn salary_share_for(r: &report::Model, pct: f64, participant_count: f64, sequence: i32) -> f64 {
    let share = crate::core::report::salary(r, pct) / participant_count;
    if sequence == 0 {
        share - penalty(r, pct)
    } else {
        share
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::report::EditReport, test_utils::*};

    #[tokio::test]
    async fn test_total_stats_counts_only_confirmed() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let employee = create_test_employee(&db, "alice").await?;

        let confirmed =
            create_test_report(&db, bookmaker.id, &[employee.id], 100.0, 150.0).await?;
        admin_confirm_test_report(&db, confirmed.id).await?;
        create_test_report(&db, bookmaker.id, &[employee.id], 500.0, 0.0).await?;

        let stats = total_stats(&db, Period::all_time()).await?;
        assert_eq!(stats.report_count, 1);
        assert_eq!(stats.bet_total, 100.0);
        assert_eq!(stats.profit, 50.0);
        assert_eq!(stats.salary_total, 10.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_period_scoping() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let employee = create_test_employee(&db, "alice").await?;

        let report = create_test_report(&db, bookmaker.id, &[employee.id], 100.0, 150.0).await?;
        admin_confirm_test_report(&db, report.id).await?;

        let recent = total_stats(&db, Period::last_days(7)).await?;
        assert_eq!(recent.report_count, 1);

        let everything = total_stats(&db, Period::all_time()).await?;
        assert_eq!(everything.report_count, 1);

        let future = Period::new(Utc::now() + Duration::days(1), Utc::now() + Duration::days(2));
        let none = total_stats(&db, future).await?;
        assert_eq!(none.report_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_country_stats_expenses() -> Result<()> {
        let db = setup_test_db().await?;
        let country = create_test_country(&db, "Spain").await?;
        let wallet = create_test_wallet(&db, "Main", 1000.0, Some(country.id)).await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, Some(country.id)).await?;

        crate::core::transfer::create_transfer(
            &db,
            crate::core::transfer::TransferRequest {
                sender: Some(crate::core::transfer::AccountRef::Wallet(wallet.id)),
                receiver: Some(crate::core::transfer::AccountRef::Bookmaker(bookmaker.id)),
                amount_sent: 250.0,
                amount_received: 240.0,
                ..Default::default()
            },
        )
        .await?;

        let stats = country_stats(&db, country.id, Period::all_time()).await?;
        assert_eq!(stats.expenses, 240.0);
        assert_eq!(stats.balances.balance, 990.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_bookmaker_stats() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "Main", 1000.0, None).await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let employee = create_test_employee(&db, "alice").await?;

        crate::core::transfer::create_transfer(
            &db,
            crate::core::transfer::TransferRequest {
                sender: Some(crate::core::transfer::AccountRef::Wallet(wallet.id)),
                receiver: Some(crate::core::transfer::AccountRef::Bookmaker(bookmaker.id)),
                amount_sent: 200.0,
                amount_received: 200.0,
                to_subledger: crate::entities::transfer::SUBLEDGER_DEPOSIT.to_string(),
                ..Default::default()
            },
        )
        .await?;
        let report = create_test_report(&db, bookmaker.id, &[employee.id], 100.0, 150.0).await?;
        admin_confirm_test_report(&db, report.id).await?;

        let stats = bookmaker_stats(&db, bookmaker.id, Period::all_time()).await?;
        assert_eq!(stats.deposit, 200.0);
        assert_eq!(stats.balance, 250.0);
        assert_eq!(stats.report_count, 1);
        assert_eq!(stats.bet_total, 100.0);
        assert_eq!(stats.return_total, 150.0);
        assert_eq!(stats.profit, 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_source_stats_attribution() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let employee = create_test_employee(&db, "alice").await?;
        let source = crate::core::report::create_source(&db, "telegram".to_string()).await?;

        let report = crate::core::report::create_report(
            &db,
            crate::core::report::NewReport {
                bookmaker_id: bookmaker.id,
                employee_ids: vec![employee.id],
                bet_amount: 100.0,
                coefficient: 1.5,
                return_amount: Some(150.0),
                source_id: Some(source.id),
                ..Default::default()
            },
        )
        .await?;
        admin_confirm_test_report(&db, report.id).await?;

        let stats = source_stats(&db, Period::all_time()).await?;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].report_count, 1);
        assert_eq!(stats[0].profit, 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_operation_log_period_scoping() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "Main", 100.0, None).await?;

        crate::core::transfer::create_transfer(
            &db,
            crate::core::transfer::TransferRequest {
                sender: Some(crate::core::transfer::AccountRef::Wallet(wallet.id)),
                amount_sent: 10.0,
                amount_received: 10.0,
                actor: "alice".to_string(),
                ..Default::default()
            },
        )
        .await?;

        let all = operation_log(&db, Period::all_time()).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].action, "create_transfer");
        assert_eq!(all[0].actor, "alice");

        let future = Period::new(Utc::now() + Duration::days(1), Utc::now() + Duration::days(2));
        assert!(operation_log(&db, future).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_export_split_per_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let alice = create_test_employee(&db, "alice").await?;
        let bob = create_test_employee(&db, "bob").await?;

        let report =
            create_test_report(&db, bookmaker.id, &[alice.id, bob.id], 150.0, 300.0).await?;
        admin_confirm_test_report(&db, report.id).await?;

        let whole = export_rows(&db, Period::all_time(), ExportOptions::default()).await?;
        assert_eq!(whole.len(), 1);
        assert_eq!(whole[0].bet_amount, 150.0);
        assert_eq!(whole[0].payout, 15.0);
        assert_eq!(whole[0].employee, "alice");

        let split = export_rows(
            &db,
            Period::all_time(),
            ExportOptions {
                split_per_employee: true,
                include_unconfirmed: false,
            },
        )
        .await?;
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].bet_amount, 75.0);
        assert_eq!(split[0].payout, 7.5);
        assert_eq!(split[1].payout, 7.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_export_penalty_payout() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let employee = create_test_employee(&db, "alice").await?;

        let report = create_test_report(&db, bookmaker.id, &[employee.id], 100.0, 0.0).await?;
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

        let rows = export_rows(&db, Period::all_time(), ExportOptions::default()).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payout, -30.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_export_includes_open_reports_on_request() -> Result<()> {
        let db = setup_test_db().await?;
        let bookmaker = create_test_bookmaker(&db, "profile01", 10.0, None).await?;
        let employee = create_test_employee(&db, "alice").await?;

        create_test_report(&db, bookmaker.id, &[employee.id], 100.0, 180.0).await?;

        let confirmed_only =
            export_rows(&db, Period::all_time(), ExportOptions::default()).await?;
        assert!(confirmed_only.is_empty());

        let all = export_rows(
            &db,
            Period::all_time(),
            ExportOptions {
                split_per_employee: false,
                include_unconfirmed: true,
            },
        )
        .await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, "open");

        Ok(())
    }
}
