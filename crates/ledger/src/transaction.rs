//! Transaction-log records.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use corebank_accounts::AccountNo;
use corebank_core::{DomainError, TxnId};

/// Kind of a completed money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Deposit,
    Withdraw,
    Transfer,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Deposit => "deposit",
            TxnKind::Withdraw => "withdraw",
            TxnKind::Transfer => "transfer",
        }
    }
}

impl FromStr for TxnKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TxnKind::Deposit),
            "withdraw" => Ok(TxnKind::Withdraw),
            "transfer" => Ok(TxnKind::Transfer),
            _ => Err(DomainError::invalid_request(format!(
                "unknown transaction kind: {s}"
            ))),
        }
    }
}

/// One append-only entry in the transaction log.
///
/// Created once per completed money movement, together with the balance
/// mutation it records; never updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txn_id: TxnId,
    pub kind: TxnKind,
    pub amount: Decimal,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    fn record(kind: TxnKind, amount: Decimal, details: String) -> Self {
        Self {
            txn_id: TxnId::new(),
            kind,
            amount,
            details,
            timestamp: Utc::now(),
        }
    }

    pub fn deposit(account_no: &AccountNo, amount: Decimal) -> Self {
        Self::record(
            TxnKind::Deposit,
            amount,
            format!("Deposit to {account_no}"),
        )
    }

    pub fn withdraw(account_no: &AccountNo, amount: Decimal) -> Self {
        Self::record(
            TxnKind::Withdraw,
            amount,
            format!("Withdraw from {account_no}"),
        )
    }

    pub fn transfer(from: &AccountNo, to: &AccountNo, amount: Decimal) -> Self {
        Self::record(TxnKind::Transfer, amount, format!("From {from} to {to}"))
    }
}

/// Validate the `(from, to)` pair of a transfer request.
///
/// Runs before any account lookup: both sides must be present and must name
/// different accounts.
pub fn validate_transfer_pair(from: &str, to: &str) -> Result<(), DomainError> {
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() || from == to {
        return Err(DomainError::invalid_request(
            "provide two different account numbers",
        ));
    }
    Ok(())
}
