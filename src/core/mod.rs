//! Core business logic - framework-agnostic operations over the ledger.
//!
//! Each submodule owns one concern: account bookkeeping, balance derivation,
//! the transfer protocol, the report workflow, payroll, lifecycle rules, and
//! read-only statistics. All functions are async and return `Result` types.

pub mod accounts;
pub mod balance;
pub mod lifecycle;
pub mod payroll;
pub mod report;
pub mod stats;
pub mod transfer;
