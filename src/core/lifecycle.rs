//! Account lifecycle - deactivation, guarded deletion, and the maintenance
//! sweeps.
//!
//! Nothing holding money may be deleted: every removal re-derives the balance
//! first and refuses within a one-cent tolerance. The sweeps are stricter and
//! use an exact-zero tolerance, since they run unattended. Deletion is always
//! soft; the only physical deletes happen in the retention purge.

use crate::{
    core::{
        accounts, balance,
        balance::{CURRENCY_EPSILON, EXACT_EPSILON},
        transfer::record_operation,
    },
    entities::{
        Bookmaker, Report, ReportEmployee, bookmaker, country, report, report_employee, wallet,
    },
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, warn};

/// Takes a bookmaker profile out of active play, stamping when. Already
/// inactive profiles keep their original stamp.
pub async fn deactivate_bookmaker(
    db: &DatabaseConnection,
    bookmaker_id: i64,
) -> Result<bookmaker::Model> {
    let bookmaker = accounts::get_bookmaker_by_id(db, bookmaker_id)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", bookmaker_id))?;

    if !bookmaker.is_active {
        return Ok(bookmaker);
    }

    let mut active: bookmaker::ActiveModel = bookmaker.into();
    active.is_active = Set(false);
    active.deactivated_at = Set(Some(Utc::now()));
    let updated = active.update(db).await?;

    info!(bookmaker_id = updated.id, "Deactivated bookmaker profile");
    Ok(updated)
}

/// Puts a bookmaker profile back into active play.
pub async fn activate_bookmaker(
    db: &DatabaseConnection,
    bookmaker_id: i64,
) -> Result<bookmaker::Model> {
    let bookmaker = accounts::get_bookmaker_by_id(db, bookmaker_id)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", bookmaker_id))?;

    let mut active: bookmaker::ActiveModel = bookmaker.into();
    active.is_active = Set(true);
    active.deactivated_at = Set(None);
    let updated = active.update(db).await?;

    info!(bookmaker_id = updated.id, "Reactivated bookmaker profile");
    Ok(updated)
}

/// Soft-deletes a wallet, refusing while it still holds money.
///
/// The balance is re-derived inside the transaction so a transfer landing
/// concurrently cannot slip past the guard.
pub async fn remove_wallet(db: &DatabaseConnection, wallet_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let current = balance::wallet_balance_by_id(&txn, wallet_id).await?;
    if current.abs() >= CURRENCY_EPSILON {
        return Err(Error::PolicyViolation {
            reason: format!("Cannot delete wallet {wallet_id}: non-zero balance {current:.2}"),
        });
    }

    let (wallet, _) = balance::load_wallet_with_transfers(&txn, wallet_id).await?;
    let mut active: wallet::ActiveModel = wallet.into();
    active.is_deleted = Set(true);
    active.update(&txn).await?;
    record_operation(
        &txn,
        "",
        "delete_wallet",
        &format!("Soft-deleted wallet {wallet_id}"),
    )
    .await?;

    txn.commit().await?;
    info!(wallet_id, "Deleted wallet");
    Ok(())
}

/// Soft-deletes a bookmaker profile, refusing while it still holds money.
pub async fn remove_bookmaker(db: &DatabaseConnection, bookmaker_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let current = balance::bookmaker_balance_by_id(&txn, bookmaker_id).await?;
    if current.abs() >= CURRENCY_EPSILON {
        return Err(Error::PolicyViolation {
            reason: format!(
                "Cannot delete bookmaker {bookmaker_id}: non-zero balance {current:.2}"
            ),
        });
    }

    let (bookmaker, _, _) = balance::load_bookmaker_with_records(&txn, bookmaker_id).await?;
    let mut active: bookmaker::ActiveModel = bookmaker.into();
    active.is_deleted = Set(true);
    active.update(&txn).await?;
    record_operation(
        &txn,
        "",
        "delete_bookmaker",
        &format!("Soft-deleted bookmaker {bookmaker_id}"),
    )
    .await?;

    txn.commit().await?;
    info!(bookmaker_id, "Deleted bookmaker profile");
    Ok(())
}

/// Soft-deletes a country and all its accounts, refusing while the country
/// still holds money across every non-deleted account.
pub async fn remove_country(db: &DatabaseConnection, country_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let balances = balance::country_balances(&txn, country_id).await?;
    if balances.active_balance.abs() >= CURRENCY_EPSILON {
        return Err(Error::PolicyViolation {
            reason: format!(
                "Cannot delete country {country_id}: non-zero balance {:.2}",
                balances.active_balance
            ),
        });
    }

    crate::entities::Wallet::update_many()
        .col_expr(wallet::Column::IsDeleted, Expr::value(true))
        .filter(wallet::Column::CountryId.eq(country_id))
        .exec(&txn)
        .await?;
    Bookmaker::update_many()
        .col_expr(bookmaker::Column::IsDeleted, Expr::value(true))
        .filter(bookmaker::Column::CountryId.eq(country_id))
        .exec(&txn)
        .await?;

    let country = accounts::get_country_by_id(&txn, country_id)
        .await?
        .ok_or_else(|| Error::not_found("country", country_id))?;
    let mut active: country::ActiveModel = country.into();
    active.is_deleted = Set(true);
    active.update(&txn).await?;
    record_operation(
        &txn,
        "",
        "delete_country",
        &format!("Soft-deleted country {country_id} and its accounts"),
    )
    .await?;

    txn.commit().await?;
    info!(country_id, "Deleted country and its accounts");
    Ok(())
}

/// Physically purges reports soft-deleted longer ago than the retention
/// window, association rows first. Returns the number of reports purged.
///
/// One bad record never aborts the sweep: failures are logged and the purge
/// moves on.
pub async fn purge_deleted_reports(db: &DatabaseConnection, retention_days: i64) -> Result<u64> {
    let cutoff = Utc::now() - Duration::days(retention_days);

    let expired = Report::find()
        .filter(report::Column::IsDeleted.eq(true))
        .filter(report::Column::DeletedAt.lt(cutoff))
        .all(db)
        .await?;

    let mut purged = 0;
    for stale in expired {
        let report_id = stale.id;
        let result: Result<()> = async {
            let txn = db.begin().await?;
            ReportEmployee::delete_many()
                .filter(report_employee::Column::ReportId.eq(report_id))
                .exec(&txn)
                .await?;
            Report::delete_by_id(report_id).exec(&txn).await?;
            txn.commit().await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => purged += 1,
            Err(e) => warn!(report_id, error = %e, "Failed to purge report, skipping"),
        }
    }

    info!(purged, retention_days, "Retention purge finished");
    Ok(purged)
}

/// Archives (soft-deletes) bookmaker profiles deactivated longer ago than the
/// threshold, once both subledgers sit at exact zero. Returns the number of
/// profiles archived.
///
/// Fail-open: a profile whose balance cannot be derived is skipped with a
/// warning rather than archived.
pub async fn archive_dormant_bookmakers(
    db: &DatabaseConnection,
    threshold_days: i64,
) -> Result<u64> {
    let cutoff = Utc::now() - Duration::days(threshold_days);

    let dormant = Bookmaker::find()
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .filter(bookmaker::Column::IsActive.eq(false))
        .filter(bookmaker::Column::DeactivatedAt.lt(cutoff))
        .all(db)
        .await?;

    let mut archived = 0;
    for profile in dormant {
        let bookmaker_id = profile.id;

        let (overall, deposit) = match balance::load_bookmaker_with_records(db, bookmaker_id).await
        {
            Ok((bookmaker, transfers, reports)) => (
                balance::bookmaker_balance(&bookmaker, &transfers, &reports),
                balance::bookmaker_deposit(&bookmaker, &transfers),
            ),
            Err(e) => {
                warn!(bookmaker_id, error = %e, "Could not derive balance, skipping archival");
                continue;
            }
        };

        if overall.abs() >= EXACT_EPSILON || deposit.abs() >= EXACT_EPSILON {
            continue;
        }

        let mut active: bookmaker::ActiveModel = profile.into();
        active.is_deleted = Set(true);
        match active.update(db).await {
            Ok(_) => {
                archived += 1;
                info!(bookmaker_id, "Archived dormant bookmaker profile");
            }
            Err(e) => warn!(bookmaker_id, error = %e, "Failed to archive profile, skipping"),
        }
    }

    info!(archived, threshold_days, "Archival sweep finished");
    Ok(archived)
}
