//! `corebank-ledger` — Ledger Operations and Transaction Log domain.
//!
//! Transaction records for completed money movements, plus the request-level
//! validation that runs before any account is looked up.

pub mod transaction;

pub use transaction::{Transaction, TxnKind, validate_transfer_pair};
