//! Postgres-backed store implementation.
//!
//! ## Error mapping
//!
//! SQLx errors map to [`StoreError`] as follows: unique-constraint
//! violations (SQLSTATE `23505`) become `DomainError::Conflict` (the
//! commit-time race pre-validation cannot catch); everything else becomes
//! `StoreError::Storage` with the failing operation named.
//!
//! ## Concurrency
//!
//! Every money operation runs in one SQL transaction and locks the balance
//! row(s) it touches with `SELECT ... FOR UPDATE`, so concurrent mutations
//! of the same account serialize instead of losing updates. A transfer locks
//! its two rows in ascending account-number order, which keeps crossing
//! transfers from deadlocking. The transaction-log insert happens inside the
//! same transaction as the balance update: both commit or neither does.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction as SqlTransaction};
use tracing::instrument;

use corebank_accounts::{AccountNo, AccountType, Customer, PinHash};
use corebank_core::{DomainError, TxnId};
use corebank_ledger::{Transaction, TxnKind};

use super::{BankStore, StoreError};

/// Postgres-backed customer + transaction-log store.
#[derive(Debug, Clone)]
pub struct PostgresBankStore {
    pool: Arc<PgPool>,
}

impl PostgresBankStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Storage(format!("connect: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Storage(format!("migrate: {e}")))?;

        Ok(Self::new(pool))
    }
}

fn map_sqlx_error(operation: &'static str, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            let message = match db.constraint() {
                Some(c) if c.contains("account_no") => "account number already exists",
                _ => "email or mobile already exists",
            };
            return DomainError::conflict(message).into();
        }
    }
    StoreError::Storage(format!("{operation}: {e}"))
}

fn customer_from_row(row: &PgRow) -> Result<Customer, StoreError> {
    let account_no: String = row
        .try_get("account_no")
        .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?;
    let account_type: String = row
        .try_get("account_type")
        .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?;

    Ok(Customer {
        account_no: account_no
            .parse()
            .map_err(|e: DomainError| StoreError::Storage(format!("stored account_no: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        email: row
            .try_get("email")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        mobile: row
            .try_get("mobile")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        pin_hash: PinHash::from_stored(
            row.try_get("pin_hash")
                .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        ),
        account_type: account_type
            .parse::<AccountType>()
            .map_err(|e| StoreError::Storage(format!("stored account_type: {e}")))?,
        balance: row
            .try_get("balance")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, StoreError> {
    let txn_id: uuid::Uuid = row
        .try_get("txn_id")
        .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?;
    let kind: String = row
        .try_get("kind")
        .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?;

    Ok(Transaction {
        txn_id: TxnId::from_uuid(txn_id),
        kind: kind
            .parse::<TxnKind>()
            .map_err(|e| StoreError::Storage(format!("stored kind: {e}")))?,
        amount: row
            .try_get("amount")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        details: row
            .try_get("details")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
        timestamp: row
            .try_get("timestamp")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))?,
    })
}

/// Lock one balance row, returning its current balance.
async fn lock_balance(
    tx: &mut SqlTransaction<'_, Postgres>,
    account_no: &AccountNo,
) -> Result<Decimal, StoreError> {
    let row = sqlx::query("SELECT balance FROM customers WHERE account_no = $1 FOR UPDATE")
        .bind(account_no.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_balance", e))?
        .ok_or(StoreError::Domain(DomainError::NotFound))?;

    row.try_get("balance")
        .map_err(|e| StoreError::Storage(format!("row decode: {e}")))
}

async fn update_balance(
    tx: &mut SqlTransaction<'_, Postgres>,
    account_no: &AccountNo,
    balance: Decimal,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE customers SET balance = $2 WHERE account_no = $1")
        .bind(account_no.as_str())
        .bind(balance)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_balance", e))?;
    Ok(())
}

/// Append the log entry inside the caller's transaction, so the balance
/// mutation and its record commit as one unit.
async fn append_txn(
    tx: &mut SqlTransaction<'_, Postgres>,
    txn: &Transaction,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO transactions (txn_id, kind, amount, details, timestamp)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(txn.txn_id.as_uuid())
    .bind(txn.kind.as_str())
    .bind(txn.amount)
    .bind(&txn.details)
    .bind(txn.timestamp)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("append_txn", e))?;
    Ok(())
}

#[async_trait]
impl BankStore for PostgresBankStore {
    #[instrument(skip(self, customer), fields(account_no = %customer.account_no), err)]
    async fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO customers
                (account_no, name, email, mobile, pin_hash, account_type, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(customer.account_no.as_str())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.mobile)
        .bind(customer.pin_hash.as_str())
        .bind(customer.account_type.as_str())
        .bind(customer.balance)
        .bind(customer.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }

    async fn customer(&self, account_no: &AccountNo) -> Result<Customer, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT account_no, name, email, mobile, pin_hash, account_type, balance, created_at
            FROM customers
            WHERE account_no = $1
            "#,
        )
        .bind(account_no.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("customer", e))?
        .ok_or(StoreError::Domain(DomainError::NotFound))?;

        customer_from_row(&row)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT account_no, name, email, mobile, pin_hash, account_type, balance, created_at
            FROM customers
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;

        rows.iter().map(customer_from_row).collect()
    }

    #[instrument(skip(self), fields(account_no = %account_no), err)]
    async fn delete_customer(&self, account_no: &AccountNo) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM customers WHERE account_no = $1")
            .bind(account_no.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound.into());
        }
        Ok(())
    }

    async fn account_exists(&self, account_no: &AccountNo) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM customers WHERE account_no = $1) AS taken")
            .bind(account_no.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("account_exists", e))?;

        row.try_get("taken")
            .map_err(|e| StoreError::Storage(format!("row decode: {e}")))
    }

    #[instrument(skip(self, txn), fields(account_no = %account_no, %amount), err)]
    async fn credit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let balance = lock_balance(&mut tx, account_no).await? + amount;
        update_balance(&mut tx, account_no, balance).await?;
        append_txn(&mut tx, &txn).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(balance)
    }

    #[instrument(skip(self, txn), fields(account_no = %account_no, %amount), err)]
    async fn debit(
        &self,
        account_no: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<Decimal, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let current = lock_balance(&mut tx, account_no).await?;
        if current < amount {
            return Err(DomainError::InsufficientFunds.into());
        }

        let balance = current - amount;
        update_balance(&mut tx, account_no, balance).await?;
        append_txn(&mut tx, &txn).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(balance)
    }

    #[instrument(skip(self, txn), fields(from = %from, to = %to, %amount), err)]
    async fn transfer(
        &self,
        from: &AccountNo,
        to: &AccountNo,
        amount: Decimal,
        txn: Transaction,
    ) -> Result<(Decimal, Decimal), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Lock both rows in ascending account-number order.
        let (first, second) = if from <= to { (from, to) } else { (to, from) };
        let first_balance = lock_balance(&mut tx, first).await?;
        let second_balance = lock_balance(&mut tx, second).await?;

        let (source, destination) = if first == from {
            (first_balance, second_balance)
        } else {
            (second_balance, first_balance)
        };
        if source < amount {
            return Err(DomainError::InsufficientFunds.into());
        }

        let from_balance = source - amount;
        let to_balance = destination + amount;
        update_balance(&mut tx, from, from_balance).await?;
        update_balance(&mut tx, to, to_balance).await?;
        append_txn(&mut tx, &txn).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok((from_balance, to_balance))
    }

    async fn recent_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT txn_id, kind, amount, details, timestamp
            FROM transactions
            ORDER BY timestamp DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("recent_transactions", e))?;

        rows.iter().map(transaction_from_row).collect()
    }
}
