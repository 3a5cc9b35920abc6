//! Operations behind every endpoint, over whichever store was selected.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use corebank_accounts::{AccountNo, Customer, CustomerDraft, NewCustomer};
use corebank_core::{DomainError, money};
use corebank_infra::{BankStore, InMemoryBankStore, PostgresBankStore, StoreError};
use corebank_ledger::{Transaction, validate_transfer_pair};

/// Attempts at drawing an unused account number before giving up.
const MAX_ACCOUNT_ATTEMPTS: u32 = 32;

/// Default size of a transaction listing when the client sends no limit.
pub const DEFAULT_TXN_LIMIT: u32 = 50;

/// Hard cap on a transaction listing, whatever the client asks for.
pub const MAX_TXN_LIMIT: u32 = 500;

/// Pick the storage backend: Postgres when `DATABASE_URL` is set (migrations
/// run on connect), otherwise the in-memory store.
pub async fn build_store() -> Arc<dyn BankStore> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PostgresBankStore::connect(&url)
                .await
                .unwrap_or_else(|e| panic!("failed to set up Postgres store: {e}"));
            tracing::info!("using Postgres store");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryBankStore::new())
        }
    }
}

/// Account registry + ledger operations, shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn BankStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self { store }
    }

    /// Register a customer: validate every field, allocate an account
    /// number, insert with a zero balance. Returns the new account number.
    pub async fn register_customer(&self, draft: CustomerDraft) -> Result<AccountNo, StoreError> {
        let new_customer = NewCustomer::validate(draft)?;
        let account_no = self.allocate_account_no().await?;
        self.store
            .insert_customer(new_customer.into_customer(account_no.clone()))
            .await?;

        tracing::info!(account_no = %account_no, "customer registered");
        Ok(account_no)
    }

    /// Bounded generate-and-check loop. The check against existing customers
    /// is the uniqueness mechanism; the randomness only keeps collisions
    /// rare enough that the bound is never hit in practice.
    async fn allocate_account_no(&self) -> Result<AccountNo, StoreError> {
        for _ in 0..MAX_ACCOUNT_ATTEMPTS {
            let candidate = AccountNo::generate(&mut rand::thread_rng());
            if !self.store.account_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::GenerationExhausted {
            attempts: MAX_ACCOUNT_ATTEMPTS,
        }
        .into())
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        self.store.list_customers().await
    }

    pub async fn get_customer(&self, account_no: &str) -> Result<Customer, StoreError> {
        self.store.customer(&lookup_key(account_no)?).await
    }

    pub async fn delete_customer(&self, account_no: &str) -> Result<(), StoreError> {
        self.store.delete_customer(&lookup_key(account_no)?).await?;
        tracing::info!(account_no, "customer deleted");
        Ok(())
    }

    /// Deposit `raw_amount` into an account; returns the new balance.
    pub async fn deposit(
        &self,
        account_no: &str,
        raw_amount: &JsonValue,
    ) -> Result<Decimal, StoreError> {
        let amount = money::parse_amount(raw_amount)?;
        let account_no = lookup_key(account_no)?;

        let txn = Transaction::deposit(&account_no, amount);
        let balance = self.store.credit(&account_no, amount, txn).await?;

        tracing::info!(account_no = %account_no, %amount, "deposit applied");
        Ok(balance)
    }

    /// Withdraw `raw_amount` from an account; returns the new balance.
    pub async fn withdraw(
        &self,
        account_no: &str,
        raw_amount: &JsonValue,
    ) -> Result<Decimal, StoreError> {
        let amount = money::parse_amount(raw_amount)?;
        let account_no = lookup_key(account_no)?;

        let txn = Transaction::withdraw(&account_no, amount);
        let balance = self.store.debit(&account_no, amount, txn).await?;

        tracing::info!(account_no = %account_no, %amount, "withdrawal applied");
        Ok(balance)
    }

    /// Move funds between two accounts; returns `(from, to)` balances.
    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        raw_amount: &JsonValue,
    ) -> Result<(Decimal, Decimal), StoreError> {
        validate_transfer_pair(from, to)?;
        let amount = money::parse_amount(raw_amount)?;
        let from = lookup_key(from)?;
        let to = lookup_key(to)?;

        let txn = Transaction::transfer(&from, &to, amount);
        let balances = self.store.transfer(&from, &to, amount, txn).await?;

        tracing::info!(from = %from, to = %to, %amount, "transfer applied");
        Ok(balances)
    }

    /// Most recent transactions, newest first. `limit` defaults to
    /// [`DEFAULT_TXN_LIMIT`] and is clamped to [`MAX_TXN_LIMIT`].
    pub async fn recent_transactions(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let limit = limit.unwrap_or(DEFAULT_TXN_LIMIT).clamp(1, MAX_TXN_LIMIT);
        self.store.recent_transactions(limit).await
    }
}

/// A path or body value that is not even a well-formed account number cannot
/// name an existing account; lookups treat it as unknown.
fn lookup_key(raw: &str) -> Result<AccountNo, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Domain(DomainError::NotFound))
}
