use serde::Deserialize;
use serde_json::Value as JsonValue;

use corebank_accounts::{Customer, CustomerDraft};
use corebank_core::money;
use corebank_ledger::Transaction;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/customers`. Missing fields default to empty strings
/// so validation can report them by name instead of the decoder rejecting
/// the whole body.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub pin: String,
    #[serde(default, rename = "type")]
    pub account_type: String,
}

impl CreateCustomerRequest {
    pub fn into_draft(self) -> CustomerDraft {
        CustomerDraft {
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            pin: self.pin,
            account_type: self.account_type,
        }
    }
}

/// Body of deposit/withdraw. The amount stays raw JSON (number or string)
/// until the money parser gets it.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: JsonValue,
}

/// Body of `POST /api/transfer`.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub amount: JsonValue,
}

/// Query of `GET /api/transactions`.
#[derive(Debug, Deserialize)]
pub struct TxnListQuery {
    pub limit: Option<u32>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Listing shape: the full record including `created_at`.
pub fn customer_to_json(c: &Customer) -> serde_json::Value {
    serde_json::json!({
        "account_no": c.account_no.as_str(),
        "name": c.name,
        "email": c.email,
        "mobile": c.mobile,
        "type": c.account_type.as_str(),
        "balance": money::to_f64(c.balance),
        "created_at": c.created_at.to_rfc3339(),
    })
}

/// Single-customer shape: same fields minus `created_at`.
pub fn customer_profile_to_json(c: &Customer) -> serde_json::Value {
    serde_json::json!({
        "account_no": c.account_no.as_str(),
        "name": c.name,
        "email": c.email,
        "mobile": c.mobile,
        "type": c.account_type.as_str(),
        "balance": money::to_f64(c.balance),
    })
}

pub fn transaction_to_json(t: &Transaction) -> serde_json::Value {
    serde_json::json!({
        "txn_id": t.txn_id.to_string(),
        "type": t.kind.as_str(),
        "amount": money::to_f64(t.amount),
        "details": t.details,
        "timestamp": t.timestamp.to_rfc3339(),
    })
}
