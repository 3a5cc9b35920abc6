//! Customer records and creation-input validation.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use corebank_core::{DomainError, money};

use crate::account_no::AccountNo;
use crate::pin::PinHash;

const EMAIL_SUFFIX: &str = "@gmail.com";

/// Account product type.
///
/// Serialized with its exact spelling (`"Savings"` / `"Current"`), which is
/// also the only accepted input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Savings,
    Current,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "Savings",
            AccountType::Current => "Current",
        }
    }
}

impl FromStr for AccountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Savings" => Ok(AccountType::Savings),
            "Current" => Ok(AccountType::Current),
            _ => Err(DomainError::validation(
                "type",
                "must be Savings or Current",
            )),
        }
    }
}

/// A registered customer.
///
/// `account_no` and `created_at` are immutable after creation; `balance` is
/// mutated only through the ledger operations in the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub account_no: AccountNo,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub pin_hash: PinHash,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Raw registration input, exactly as received at the API boundary.
///
/// Nothing here is trusted yet; [`NewCustomer::validate`] is the only way
/// forward.
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub pin: String,
    pub account_type: String,
}

/// Registration input that has passed field validation.
///
/// Holding a `NewCustomer` means every field rule was checked and the PIN is
/// already hashed; the record only lacks an account number.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub pin_hash: PinHash,
    pub account_type: AccountType,
}

impl NewCustomer {
    /// Validate a draft, field by field, before anything is written.
    ///
    /// The first failing field is reported as `Validation` naming it:
    /// - `name`: non-empty after trimming;
    /// - `email`: non-empty, trimmed, lowercased, ends with `@gmail.com`;
    /// - `mobile`: exactly 10 digits, first one of 6/7/8/9;
    /// - `pin`: exactly 4 digits (stored hashed);
    /// - `type`: exactly `Savings` or `Current`.
    pub fn validate(draft: CustomerDraft) -> Result<Self, DomainError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "is required"));
        }

        let email = draft.email.trim().to_lowercase();
        if email.is_empty() || !email.ends_with(EMAIL_SUFFIX) {
            return Err(DomainError::validation(
                "email",
                "must end with @gmail.com",
            ));
        }

        let mobile = draft.mobile.trim().to_string();
        if !is_valid_mobile(&mobile) {
            return Err(DomainError::validation(
                "mobile",
                "must be 10 digits starting with 6-9",
            ));
        }

        let pin_hash = PinHash::new(&draft.pin)?;
        let account_type: AccountType = draft.account_type.trim().parse()?;

        Ok(Self {
            name,
            email,
            mobile,
            pin_hash,
            account_type,
        })
    }

    /// Materialize the stored record under a freshly allocated account
    /// number, with a zero balance.
    pub fn into_customer(self, account_no: AccountNo) -> Customer {
        Customer {
            account_no,
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            pin_hash: self.pin_hash,
            account_type: self.account_type,
            balance: money::zero(),
            created_at: Utc::now(),
        }
    }
}

fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10
        && mobile.bytes().all(|b| b.is_ascii_digit())
        && matches!(mobile.as_bytes()[0], b'6'..=b'9')
}
