//! Balance derivation - every balance is a fold over immutable logs.
//!
//! No table stores a running balance. A wallet balance is its opening deposit
//! plus manual adjustments, replayed against the transfer log. A bookmaker
//! profile has two subledgers (deposit and balance); its overall balance adds
//! the real profit of every confirmed report. Soft-deleted transfers and
//! reports never contribute.

use crate::{
    core::report::{is_confirmed, real_profit},
    entities::{
        Bookmaker, Report, Transfer, Wallet, bookmaker, report,
        transfer::{self, SUBLEDGER_BALANCE, SUBLEDGER_DEPOSIT},
        wallet,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, prelude::*};

/// Tolerance for currency comparisons in user-facing guards (one cent).
pub const CURRENCY_EPSILON: f64 = 0.01;

/// Tolerance for exact-zero checks in automated maintenance.
pub const EXACT_EPSILON: f64 = 1e-9;

/// Derives a wallet balance by replaying the transfer log.
///
/// Transfers that do not touch this wallet are ignored, so callers may pass
/// either a pre-filtered slice or the full log.
#[must_use]
pub fn wallet_balance(wallet: &wallet::Model, transfers: &[transfer::Model]) -> f64 {
    let mut balance = wallet.deposit + wallet.adjustment;
    for t in transfers.iter().filter(|t| !t.is_deleted) {
        if t.sender_wallet_id == Some(wallet.id) {
            balance -= t.amount_sent;
        }
        if t.receiver_wallet_id == Some(wallet.id) {
            balance += t.amount_received;
        }
    }
    balance
}

fn bookmaker_subledger(bookmaker_id: i64, transfers: &[transfer::Model], subledger: &str) -> f64 {
    let mut sum = 0.0;
    for t in transfers.iter().filter(|t| !t.is_deleted) {
        if t.sender_bookmaker_id == Some(bookmaker_id) && t.from_subledger == subledger {
            sum -= t.amount_sent;
        }
        if t.receiver_bookmaker_id == Some(bookmaker_id) && t.to_subledger == subledger {
            sum += t.amount_received;
        }
    }
    sum
}

/// Derives the deposit subledger of a bookmaker profile: money parked at the
/// bookmaker but not yet staked.
#[must_use]
pub fn bookmaker_deposit(bookmaker: &bookmaker::Model, transfers: &[transfer::Model]) -> f64 {
    bookmaker_subledger(bookmaker.id, transfers, SUBLEDGER_DEPOSIT)
}

/// Derives the overall balance of a bookmaker profile: both subledgers plus
/// the real profit of every confirmed report booked against it.
#[must_use]
pub fn bookmaker_balance(
    bookmaker: &bookmaker::Model,
    transfers: &[transfer::Model],
    reports: &[report::Model],
) -> f64 {
    let betting_result: f64 = reports
        .iter()
        .filter(|r| r.bookmaker_id == bookmaker.id && is_confirmed(r))
        .map(real_profit)
        .sum();

    bookmaker_subledger(bookmaker.id, transfers, SUBLEDGER_DEPOSIT)
        + bookmaker_subledger(bookmaker.id, transfers, SUBLEDGER_BALANCE)
        + betting_result
}

/// Loads a wallet together with the non-deleted transfers touching it.
pub async fn load_wallet_with_transfers<C>(
    db: &C,
    wallet_id: i64,
) -> Result<(wallet::Model, Vec<transfer::Model>)>
where
    C: ConnectionTrait,
{
    let wallet = Wallet::find_by_id(wallet_id)
        .filter(wallet::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("wallet", wallet_id))?;

    let transfers = Transfer::find()
        .filter(transfer::Column::IsDeleted.eq(false))
        .filter(
            Condition::any()
                .add(transfer::Column::SenderWalletId.eq(wallet_id))
                .add(transfer::Column::ReceiverWalletId.eq(wallet_id)),
        )
        .all(db)
        .await?;

    Ok((wallet, transfers))
}

/// Derives the current balance of one wallet.
pub async fn wallet_balance_by_id<C>(db: &C, wallet_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let (wallet, transfers) = load_wallet_with_transfers(db, wallet_id).await?;
    Ok(wallet_balance(&wallet, &transfers))
}

/// Loads a bookmaker profile together with the non-deleted transfers touching
/// it and all its non-deleted reports.
pub async fn load_bookmaker_with_records<C>(
    db: &C,
    bookmaker_id: i64,
) -> Result<(
    bookmaker::Model,
    Vec<transfer::Model>,
    Vec<report::Model>,
)>
where
    C: ConnectionTrait,
{
    let bookmaker = Bookmaker::find_by_id(bookmaker_id)
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", bookmaker_id))?;

    let transfers = Transfer::find()
        .filter(transfer::Column::IsDeleted.eq(false))
        .filter(
            Condition::any()
                .add(transfer::Column::SenderBookmakerId.eq(bookmaker_id))
                .add(transfer::Column::ReceiverBookmakerId.eq(bookmaker_id)),
        )
        .all(db)
        .await?;

    let reports = Report::find()
        .filter(report::Column::BookmakerId.eq(bookmaker_id))
        .filter(report::Column::IsDeleted.eq(false))
        .all(db)
        .await?;

    Ok((bookmaker, transfers, reports))
}

/// Derives the deposit subledger of one bookmaker profile.
pub async fn bookmaker_deposit_by_id<C>(db: &C, bookmaker_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let (bookmaker, transfers, _) = load_bookmaker_with_records(db, bookmaker_id).await?;
    Ok(bookmaker_deposit(&bookmaker, &transfers))
}

/// Derives the overall balance of one bookmaker profile.
pub async fn bookmaker_balance_by_id<C>(db: &C, bookmaker_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let (bookmaker, transfers, reports) = load_bookmaker_with_records(db, bookmaker_id).await?;
    Ok(bookmaker_balance(&bookmaker, &transfers, &reports))
}

/// The two views of a country's money.
///
/// `balance` counts only profiles still in active play; `active_balance`
/// counts every non-deleted profile, so money parked on a deactivated profile
/// is still visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryBalances {
    /// Wallets plus bookmaker profiles that are marked active
    pub balance: f64,
    /// Wallets plus all non-deleted bookmaker profiles
    pub active_balance: f64,
}

/// Derives both balance views of one country.
pub async fn country_balances<C>(db: &C, country_id: i64) -> Result<CountryBalances>
where
    C: ConnectionTrait,
{
    crate::core::accounts::get_country_by_id(db, country_id)
        .await?
        .ok_or_else(|| Error::not_found("country", country_id))?;

    let wallets = Wallet::find()
        .filter(wallet::Column::CountryId.eq(country_id))
        .filter(wallet::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let bookmakers = Bookmaker::find()
        .filter(bookmaker::Column::CountryId.eq(country_id))
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let transfers = Transfer::find()
        .filter(transfer::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let bookmaker_ids: Vec<i64> = bookmakers.iter().map(|b| b.id).collect();
    let reports = Report::find()
        .filter(report::Column::BookmakerId.is_in(bookmaker_ids))
        .filter(report::Column::IsDeleted.eq(false))
        .all(db)
        .await?;

    let wallet_total: f64 = wallets.iter().map(|w| wallet_balance(w, &transfers)).sum();

    let mut active_only = 0.0;
    let mut all_profiles = 0.0;
    for b in &bookmakers {
        let balance = bookmaker_balance(b, &transfers, &reports);
        all_profiles += balance;
        if b.is_active {
            active_only += balance;
        }
    }

    Ok(CountryBalances {
        balance: wallet_total + active_only,
        active_balance: wallet_total + all_profiles,
    })
}

/// Aggregate balances across the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalBalances {
    /// Every wallet plus every non-deleted bookmaker profile
    pub total_balance: f64,
    /// All non-deleted bookmaker profiles
    pub total_bookmaker_balance: f64,
    /// Bookmaker profiles still marked active
    pub total_active_bookmaker_balance: f64,
    /// All non-deleted wallets
    pub total_wallet_balance: f64,
}

/// Derives aggregate balances across every account, including accounts not
/// attached to any country.
pub async fn total_balances<C>(db: &C) -> Result<TotalBalances>
where
    C: ConnectionTrait,
{
    let wallets = Wallet::find()
        .filter(wallet::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let bookmakers = Bookmaker::find()
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let transfers = Transfer::find()
        .filter(transfer::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let reports = Report::find()
        .filter(report::Column::IsDeleted.eq(false))
        .all(db)
        .await?;

    let total_wallet_balance: f64 = wallets.iter().map(|w| wallet_balance(w, &transfers)).sum();

    let mut total_bookmaker_balance = 0.0;
    let mut total_active_bookmaker_balance = 0.0;
    for b in &bookmakers {
        let balance = bookmaker_balance(b, &transfers, &reports);
        total_bookmaker_balance += balance;
        if b.is_active {
            total_active_bookmaker_balance += balance;
        }
    }

    Ok(TotalBalances {
        total_balance: total_wallet_balance + total_bookmaker_balance,
        total_bookmaker_balance,
        total_active_bookmaker_balance,
        total_wallet_balance,
    })
}
