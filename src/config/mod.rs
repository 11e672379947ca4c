/// Database configuration and connection management
pub mod database;

/// Application settings loading from `stakeledger.toml`
pub mod settings;
