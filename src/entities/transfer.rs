//! Transfer entity - An immutable directed money movement between accounts.
//!
//! Either endpoint may be a wallet or a bookmaker profile (or absent for an
//! external counterparty), so four nullable foreign keys stand in for a
//! polymorphic reference. Rows are never mutated after creation, only
//! soft-deleted; every balance read replays the surviving rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sub-ledger label for the bookmaker "balance" side.
pub const SUBLEDGER_BALANCE: &str = "balance";
/// Sub-ledger label for the bookmaker "deposit" side.
pub const SUBLEDGER_DEPOSIT: &str = "deposit";

/// Transfer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    /// Unique identifier for the transfer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sending wallet, if the sender is a wallet
    pub sender_wallet_id: Option<i64>,
    /// Sending bookmaker profile, if the sender is a profile
    pub sender_bookmaker_id: Option<i64>,
    /// Receiving wallet, if the receiver is a wallet
    pub receiver_wallet_id: Option<i64>,
    /// Receiving bookmaker profile, if the receiver is a profile
    pub receiver_bookmaker_id: Option<i64>,
    /// Amount debited from the sender
    pub amount_sent: f64,
    /// Amount credited to the receiver
    pub amount_received: f64,
    /// Sender sub-ledger: "", "balance", or "deposit" (bookmaker endpoints only)
    pub from_subledger: String,
    /// Receiver sub-ledger: "", "balance", or "deposit"
    pub to_subledger: String,
    /// Flow classification: "internal", "deposit", or "withdrawal"
    pub direction: String,
    /// Sender's country, used for country-level expense aggregation
    pub country_id: Option<i64>,
    /// When the transfer was recorded
    pub timestamp: DateTimeUtc,
    /// Soft delete flag - excluded from all balance replay
    pub is_deleted: bool,
}

impl Model {
    /// Commission retained by the rails: sent minus received. Negative for
    /// a rebate credit.
    #[must_use]
    pub fn commission(&self) -> f64 {
        self.amount_sent - self.amount_received
    }
}

/// Defines relationships between Transfer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transfer is attributed to the sender's country, if any
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
