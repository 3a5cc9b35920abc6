//! Durable storage for customers and the transaction log.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use corebank_accounts::{AccountNo, Customer};
use corebank_core::DomainError;
use corebank_ledger::Transaction;

/// Storage operation error.
///
/// Deterministic business failures travel as [`DomainError`]; anything the
/// backend itself fails at (connectivity, SQL, poisoned locks) is `Storage`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Customer and transaction-log store.
///
/// ## Implementation requirements
///
/// - **Uniqueness**: `account_no`, `email` and `mobile` are unique across
///   customers. Violations detected at commit time surface as
///   `DomainError::Conflict`, with no partial state left behind.
/// - **Atomic money operations**: each of [`credit`](BankStore::credit),
///   [`debit`](BankStore::debit) and [`transfer`](BankStore::transfer)
///   commits its balance mutation and its log entry as one unit. A failure
///   anywhere leaves both untouched.
/// - **Per-account serialization**: concurrent mutations of the same account
///   must not lose updates. The in-memory store serializes under a single
///   writer lock; Postgres takes row locks inside one transaction.
/// - **Non-negative balances**: `debit` and `transfer` reject amounts
///   exceeding the current balance with `DomainError::InsufficientFunds`.
#[async_trait]
pub trait BankStore: Send + Sync {
    /// Insert a freshly validated customer record.
    async fn insert_customer(&self, customer: Customer) -> Result<(), StoreError>;

    /// Fetch one customer. `NotFound` when the account number is unknown.
    async fn customer(&self, account_no: &AccountNo) -> Result<Customer, StoreError>;

    /// All customers, newest first.
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Remove a customer record. `NotFound` when missing. The transaction
    /// log is left untouched (log entries are not keyed to customers).
    async fn delete_customer(&self, account_no: &AccountNo) -> Result<(), StoreError>;

    /// Whether an account number is already taken.
    async fn account_exists(&self, account_no: &AccountNo) -> Result<bool, StoreError>;

    /// Add `amount` to the account's balance and append `txn` in the same
    /// commit. Returns the new balance.
    async fn credit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError>;

    /// Subtract `amount` from the account's balance and append `txn` in the
    /// same commit. `InsufficientFunds` when `amount` exceeds the balance.
    /// Returns the new balance.
    async fn debit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError>;

    /// Move `amount` between two distinct accounts: both balance rows and
    /// the log entry commit together. `NotFound` when either side is missing,
    /// deliberately without saying which. Returns `(from, to)` balances.
    async fn transfer(
        &self,
        from: &AccountNo,
        to: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<(Decimal, Decimal), StoreError>;

    /// Up to `limit` most recent transactions, newest first.
    async fn recent_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError>;
}

#[async_trait]
impl<S> BankStore for Arc<S>
where
    S: BankStore + ?Sized,
{
    async fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        (**self).insert_customer(customer).await
    }

    async fn customer(&self, account_no: &AccountNo) -> Result<Customer, StoreError> {
        (**self).customer(account_no).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        (**self).list_customers().await
    }

    async fn delete_customer(&self, account_no: &AccountNo) -> Result<(), StoreError> {
        (**self).delete_customer(account_no).await
    }

    async fn account_exists(&self, account_no: &AccountNo) -> Result<bool, StoreError> {
        (**self).account_exists(account_no).await
    }

    async fn credit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError> {
        (**self).credit(account_no, amount, txn).await
    }

    async fn debit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError> {
        (**self).debit(account_no, amount, txn).await
    }

    async fn transfer(
        &self,
        from: &AccountNo,
        to: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<(Decimal, Decimal), StoreError> {
        (**self).transfer(from, to, amount, txn).await
    }

    async fn recent_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError> {
        (**self).recent_transactions(limit).await
    }
}
