//! `corebank-accounts` — Account Registry domain.
//!
//! Customer records, account-number allocation, creation-input validation,
//! and PIN hashing. Persistence lives in `corebank-infra`.

pub mod account_no;
pub mod customer;
pub mod pin;

pub use account_no::{ACCOUNT_NO_LEN, AccountNo};
pub use customer::{AccountType, Customer, CustomerDraft, NewCustomer};
pub use pin::PinHash;
