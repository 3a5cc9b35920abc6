//! PIN storage.
//!
//! PINs are never persisted in the clear. A stored PIN is a salted BLAKE3
//! digest in the form `<salt-hex>$<digest-hex>`.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use corebank_core::DomainError;

const SALT_LEN: usize = 16;

/// Salted hash of a customer's 4-digit PIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinHash(String);

impl PinHash {
    /// Validate and hash a raw PIN. The PIN must be exactly 4 numeric digits.
    pub fn new(pin: &str) -> Result<Self, DomainError> {
        let pin = pin.trim();
        if pin.len() != 4 || !pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation("pin", "must be exactly 4 digits"));
        }

        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Ok(Self(encode(&salt, pin)))
    }

    /// Check a candidate PIN against the stored hash.
    pub fn verify(&self, pin: &str) -> bool {
        let Some((salt_hex, _)) = self.0.split_once('$') else {
            return false;
        };
        let Some(salt) = decode_hex(salt_hex) else {
            return false;
        };
        self.0 == encode(&salt, pin.trim())
    }

    /// Wrap an already-hashed value loaded from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn encode(salt: &[u8], pin: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(pin.as_bytes());
    format!("{}${}", hex(salt), hasher.finalize().to_hex())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
