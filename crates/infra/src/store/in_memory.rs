//! In-memory store.
//!
//! Intended for tests/dev. All mutations run under a single writer lock,
//! which is what serializes concurrent operations against the same account.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;

use corebank_accounts::{AccountNo, Customer};
use corebank_core::DomainError;
use corebank_ledger::Transaction;

use super::{BankStore, StoreError};

#[derive(Debug, Default)]
struct State {
    customers: HashMap<AccountNo, Customer>,
    transactions: Vec<Transaction>,
}

/// In-memory customer + transaction-log store.
#[derive(Debug, Default)]
pub struct InMemoryBankStore {
    state: RwLock<State>,
}

impl InMemoryBankStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl BankStore for InMemoryBankStore {
    async fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if state.customers.contains_key(&customer.account_no) {
            return Err(DomainError::conflict("account number already exists").into());
        }
        if state
            .customers
            .values()
            .any(|c| c.email == customer.email || c.mobile == customer.mobile)
        {
            return Err(DomainError::conflict("email or mobile already exists").into());
        }

        state.customers.insert(customer.account_no.clone(), customer);
        Ok(())
    }

    async fn customer(&self, account_no: &AccountNo) -> Result<Customer, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        state
            .customers
            .get(account_no)
            .cloned()
            .ok_or(StoreError::Domain(DomainError::NotFound))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut customers: Vec<Customer> = state.customers.values().cloned().collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    async fn delete_customer(&self, account_no: &AccountNo) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state
            .customers
            .remove(account_no)
            .map(|_| ())
            .ok_or(StoreError::Domain(DomainError::NotFound))
    }

    async fn account_exists(&self, account_no: &AccountNo) -> Result<bool, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.customers.contains_key(account_no))
    }

    async fn credit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let customer = state
            .customers
            .get_mut(account_no)
            .ok_or(StoreError::Domain(DomainError::NotFound))?;

        customer.balance += amount;
        let balance = customer.balance;
        state.transactions.push(txn);
        Ok(balance)
    }

    async fn debit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let customer = state
            .customers
            .get_mut(account_no)
            .ok_or(StoreError::Domain(DomainError::NotFound))?;

        if customer.balance < amount {
            return Err(DomainError::InsufficientFunds.into());
        }

        customer.balance -= amount;
        let balance = customer.balance;
        state.transactions.push(txn);
        Ok(balance)
    }

    async fn transfer(
        &self,
        from: &AccountNo,
        to: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<(Decimal, Decimal), StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        // Existence of both sides is checked before touching either balance.
        if !state.customers.contains_key(from) || !state.customers.contains_key(to) {
            return Err(DomainError::NotFound.into());
        }

        let source = state
            .customers
            .get_mut(from)
            .ok_or(StoreError::Domain(DomainError::NotFound))?;
        if source.balance < amount {
            return Err(DomainError::InsufficientFunds.into());
        }
        source.balance -= amount;
        let from_balance = source.balance;

        let destination = state
            .customers
            .get_mut(to)
            .ok_or(StoreError::Domain(DomainError::NotFound))?;
        destination.balance += amount;
        let to_balance = destination.balance;

        state.transactions.push(txn);
        Ok((from_balance, to_balance))
    }

    async fn recent_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .transactions
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
