//! The transfer protocol - append-only money movement between accounts.
//!
//! A transfer records what the sender gave up and what the receiver actually
//! got; the difference is the commission taken in flight. Transfers are never
//! edited. Corrections happen by soft-deleting the bad row, which removes it
//! from every balance replay.

use crate::{
    core::accounts,
    entities::{
        CommissionHistory, OperationHistory, Transfer, commission_history, operation_history,
        transfer::{self, SUBLEDGER_BALANCE},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Direction label for a transfer with both endpoints in the ledger.
pub const DIRECTION_INTERNAL: &str = "internal";
/// Direction label for money arriving from outside the ledger.
pub const DIRECTION_DEPOSIT: &str = "deposit";
/// Direction label for money leaving the ledger.
pub const DIRECTION_WITHDRAWAL: &str = "withdrawal";

/// One endpoint of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRef {
    Wallet(i64),
    Bookmaker(i64),
}

/// Parameters for [`create_transfer`].
///
/// At least one endpoint must be present; an absent sender means an external
/// deposit, an absent receiver an external withdrawal. Subledger labels only
/// matter for bookmaker endpoints and default to the balance subledger.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender: Option<AccountRef>,
    pub receiver: Option<AccountRef>,
    /// Amount debited from the sender
    pub amount_sent: f64,
    /// Amount credited to the receiver; the shortfall is the commission
    pub amount_received: f64,
    /// Sender-side subledger, when the sender is a bookmaker
    pub from_subledger: String,
    /// Receiver-side subledger, when the receiver is a bookmaker
    pub to_subledger: String,
    /// Who initiated the transfer, recorded in the commission history
    pub actor: String,
}

impl Default for TransferRequest {
    fn default() -> Self {
        Self {
            sender: None,
            receiver: None,
            amount_sent: 0.0,
            amount_received: 0.0,
            from_subledger: SUBLEDGER_BALANCE.to_string(),
            to_subledger: SUBLEDGER_BALANCE.to_string(),
            actor: String::new(),
        }
    }
}

/// Resolves the country a transfer belongs to: the sender's country when
/// present, otherwise the receiver's.
async fn resolve_endpoint<C>(db: &C, endpoint: AccountRef) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    match endpoint {
        AccountRef::Wallet(id) => {
            let wallet = accounts::get_wallet_by_id(db, id)
                .await?
                .ok_or_else(|| Error::not_found("wallet", id))?;
            Ok(wallet.country_id)
        }
        AccountRef::Bookmaker(id) => {
            let bookmaker = accounts::get_bookmaker_by_id(db, id)
                .await?
                .ok_or_else(|| Error::not_found("bookmaker", id))?;
            Ok(bookmaker.country_id)
        }
    }
}

fn direction_for(sender: Option<AccountRef>, receiver: Option<AccountRef>) -> &'static str {
    match (sender, receiver) {
        (Some(_), Some(_)) => DIRECTION_INTERNAL,
        (None, Some(_)) => DIRECTION_DEPOSIT,
        _ => DIRECTION_WITHDRAWAL,
    }
}

/// Appends a transfer to the log.
///
/// Validates both amounts, requires at least one endpoint, and requires every
/// named endpoint to exist and not be soft-deleted. The transfer row, its
/// commission-history row, and its operation-log entry are written in one
/// transaction.
///
/// # Errors
/// Returns `Error::InvalidAmount` for non-finite or negative amounts,
/// `Error::PolicyViolation` when both endpoints are absent, and
/// `Error::NotFound` for missing endpoints.
pub async fn create_transfer(
    db: &DatabaseConnection,
    request: TransferRequest,
) -> Result<transfer::Model> {
    if !request.amount_sent.is_finite() || request.amount_sent < 0.0 {
        return Err(Error::InvalidAmount {
            amount: request.amount_sent,
        });
    }
    if !request.amount_received.is_finite() || request.amount_received < 0.0 {
        return Err(Error::InvalidAmount {
            amount: request.amount_received,
        });
    }
    if request.sender.is_none() && request.receiver.is_none() {
        return Err(Error::PolicyViolation {
            reason: "Transfer needs at least one endpoint".to_string(),
        });
    }

    let mut country_id = None;
    if let Some(sender) = request.sender {
        country_id = resolve_endpoint(db, sender).await?;
    }
    if let Some(receiver) = request.receiver {
        let receiver_country = resolve_endpoint(db, receiver).await?;
        if country_id.is_none() {
            country_id = receiver_country;
        }
    }

    let direction = direction_for(request.sender, request.receiver);
    let timestamp = Utc::now();

    let (sender_wallet_id, sender_bookmaker_id) = match request.sender {
        Some(AccountRef::Wallet(id)) => (Some(id), None),
        Some(AccountRef::Bookmaker(id)) => (None, Some(id)),
        None => (None, None),
    };
    let (receiver_wallet_id, receiver_bookmaker_id) = match request.receiver {
        Some(AccountRef::Wallet(id)) => (Some(id), None),
        Some(AccountRef::Bookmaker(id)) => (None, Some(id)),
        None => (None, None),
    };

    let txn = db.begin().await?;

    let transfer = transfer::ActiveModel {
        sender_wallet_id: Set(sender_wallet_id),
        sender_bookmaker_id: Set(sender_bookmaker_id),
        receiver_wallet_id: Set(receiver_wallet_id),
        receiver_bookmaker_id: Set(receiver_bookmaker_id),
        amount_sent: Set(request.amount_sent),
        amount_received: Set(request.amount_received),
        from_subledger: Set(request.from_subledger),
        to_subledger: Set(request.to_subledger),
        direction: Set(direction.to_string()),
        country_id: Set(country_id),
        timestamp: Set(timestamp),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    commission_history::ActiveModel {
        date: Set(timestamp),
        actor: Set(request.actor.clone()),
        commission: Set(transfer.commission()),
        direction: Set(direction.to_string()),
        description: Set(format!(
            "Transfer {}: sent {:.2}, received {:.2}",
            transfer.id, transfer.amount_sent, transfer.amount_received
        )),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    record_operation(
        &txn,
        &request.actor,
        "create_transfer",
        &format!(
            "Transfer {} ({direction}): sent {:.2}, received {:.2}",
            transfer.id, transfer.amount_sent, transfer.amount_received
        ),
    )
    .await?;

    txn.commit().await?;

    info!(
        transfer_id = transfer.id,
        direction,
        amount_sent = transfer.amount_sent,
        amount_received = transfer.amount_received,
        "Recorded transfer"
    );

    Ok(transfer)
}

/// Soft-deletes a transfer, removing it from every balance replay.
///
/// Idempotent: deleting an already-deleted transfer returns it unchanged.
pub async fn soft_delete_transfer(
    db: &DatabaseConnection,
    transfer_id: i64,
) -> Result<transfer::Model> {
    let transfer = Transfer::find_by_id(transfer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("transfer", transfer_id))?;

    if transfer.is_deleted {
        return Ok(transfer);
    }

    let txn = db.begin().await?;
    let mut active: transfer::ActiveModel = transfer.into();
    active.is_deleted = Set(true);
    let deleted = active.update(&txn).await?;
    record_operation(
        &txn,
        "",
        "delete_transfer",
        &format!("Soft-deleted transfer {}", deleted.id),
    )
    .await?;
    txn.commit().await?;

    info!(transfer_id = deleted.id, "Soft-deleted transfer");
    Ok(deleted)
}

/// Appends one entry to the operation log. Callers already inside a
/// transaction pass it along so the entry lands or rolls back with the
/// mutation it describes.
pub(crate) async fn record_operation<C>(
    db: &C,
    actor: &str,
    action: &str,
    details: &str,
) -> Result<()>
where
    C: ConnectionTrait,
{
    operation_history::ActiveModel {
        date: Set(Utc::now()),
        actor: Set(actor.to_string()),
        action: Set(action.to_string()),
        details: Set(details.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Returns the most recent commission-history entries, newest first.
pub async fn recent_commissions(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<commission_history::Model>> {
    CommissionHistory::find()
        .order_by_desc(commission_history::Column::Date)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the most recent operation-log entries, newest first.
pub async fn recent_operations(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<operation_history::Model>> {
    OperationHistory::find()
        .order_by_desc(operation_history::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_transfer_requires_endpoint() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_transfer(
            &db,
            TransferRequest {
                amount_sent: 10.0,
                amount_received: 10.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::PolicyViolation { reason: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_rejects_bad_amounts() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "Main", 100.0, None).await?;

        for (sent, received) in [(-1.0, 0.0), (f64::NAN, 0.0), (10.0, f64::INFINITY)] {
            let result = create_transfer(
                &db,
                TransferRequest {
                    sender: Some(AccountRef::Wallet(wallet.id)),
                    amount_sent: sent,
                    amount_received: received,
                    ..Default::default()
                },
            )
            .await;
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidAmount { amount: _ }
            ));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_rejects_missing_endpoint() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(999)),
                amount_sent: 10.0,
                amount_received: 10.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "wallet",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_commission_recorded_in_history() -> Result<()> {
        let db = setup_test_db().await?;
        let sender = create_test_wallet(&db, "Sender", 1000.0, None).await?;
        let receiver = create_test_wallet(&db, "Receiver", 0.0, None).await?;

        let transfer = create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(sender.id)),
                receiver: Some(AccountRef::Wallet(receiver.id)),
                amount_sent: 700.0,
                amount_received: 650.0,
                actor: "alice".to_string(),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(transfer.commission(), 50.0);

        let history = recent_commissions(&db, 10).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].commission, 50.0);
        assert_eq!(history[0].actor, "alice");
        assert_eq!(history[0].direction, DIRECTION_INTERNAL);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_commission_still_recorded() -> Result<()> {
        let db = setup_test_db().await?;
        let sender = create_test_wallet(&db, "Sender", 1000.0, None).await?;
        let receiver = create_test_wallet(&db, "Receiver", 0.0, None).await?;

        create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(sender.id)),
                receiver: Some(AccountRef::Wallet(receiver.id)),
                amount_sent: 100.0,
                amount_received: 100.0,
                ..Default::default()
            },
        )
        .await?;

        let history = recent_commissions(&db, 10).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].commission, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_rebate_records_negative_commission() -> Result<()> {
        let db = setup_test_db().await?;
        let sender = create_test_wallet(&db, "Sender", 100.0, None).await?;
        let receiver = create_test_wallet(&db, "Receiver", 0.0, None).await?;

        // Bonus credit: more arrives than was sent.
        let transfer = create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(sender.id)),
                receiver: Some(AccountRef::Wallet(receiver.id)),
                amount_sent: 10.0,
                amount_received: 12.0,
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(transfer.commission(), -2.0);
        let history = recent_commissions(&db, 10).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].commission, -2.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_operation_log_records_transfers() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "Main", 100.0, None).await?;

        let transfer = create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(wallet.id)),
                amount_sent: 10.0,
                amount_received: 10.0,
                actor: "alice".to_string(),
                ..Default::default()
            },
        )
        .await?;
        soft_delete_transfer(&db, transfer.id).await?;

        let log = recent_operations(&db, 10).await?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, "delete_transfer");
        assert_eq!(log[1].action, "create_transfer");
        assert_eq!(log[1].actor, "alice");

        let last_one = recent_operations(&db, 1).await?;
        assert_eq!(last_one.len(), 1);
        assert_eq!(last_one[0].action, "delete_transfer");

        Ok(())
    }

    #[tokio::test]
    async fn test_direction_and_country_derivation() -> Result<()> {
        let db = setup_test_db().await?;
        let country = create_test_country(&db, "Spain").await?;
        let wallet = create_test_wallet(&db, "Main", 100.0, Some(country.id)).await?;

        let deposit = create_transfer(
            &db,
            TransferRequest {
                receiver: Some(AccountRef::Wallet(wallet.id)),
                amount_sent: 50.0,
                amount_received: 50.0,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(deposit.direction, DIRECTION_DEPOSIT);
        assert_eq!(deposit.country_id, Some(country.id));

        let withdrawal = create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(wallet.id)),
                amount_sent: 20.0,
                amount_received: 20.0,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(withdrawal.direction, DIRECTION_WITHDRAWAL);

        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "Main", 100.0, None).await?;

        let transfer = create_transfer(
            &db,
            TransferRequest {
                sender: Some(AccountRef::Wallet(wallet.id)),
                amount_sent: 10.0,
                amount_received: 10.0,
                ..Default::default()
            },
        )
        .await?;

        let first = soft_delete_transfer(&db, transfer.id).await?;
        assert!(first.is_deleted);
        let second = soft_delete_transfer(&db, transfer.id).await?;
        assert!(second.is_deleted);

        Ok(())
    }
}
