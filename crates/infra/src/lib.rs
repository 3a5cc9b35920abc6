//! `corebank-infra` — storage backends for the banking ledger.
//!
//! The [`store::BankStore`] trait is the persistence boundary; it ships with
//! an in-memory implementation (tests/dev) and a Postgres implementation
//! (production).

pub mod store;

pub use store::in_memory::InMemoryBankStore;
pub use store::postgres::PostgresBankStore;
pub use store::{BankStore, StoreError};
