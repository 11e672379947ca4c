//! Unified error type for the crate.
//!
//! Every rejected mutation carries the specific human-readable reason so the
//! bot/web collaborators can surface it verbatim. All domain variants are
//! recoverable; none abort the process.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failure
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying SeaORM / SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (config file, database path)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A referenced record does not exist or is soft-deleted
    #[error("{entity} {id} not found or deleted")]
    NotFound {
        /// Entity kind ("wallet", "bookmaker", "report", ...)
        entity: &'static str,
        /// The identifier that failed to resolve
        id: String,
    },

    /// Non-finite or otherwise malformed monetary input
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// A business rule rejected the mutation
    #[error("Policy violation: {reason}")]
    PolicyViolation {
        /// Specific rule and offending value, e.g. the non-zero balance
        reason: String,
    },

    /// A lost-update race was detected; the caller may retry
    #[error("Concurrency conflict: {reason}")]
    ConcurrencyConflict {
        /// Which write detected the conflict
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
