//! Account numbers.

use core::fmt;
use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use corebank_core::DomainError;

/// Digits in an account number.
pub const ACCOUNT_NO_LEN: usize = 12;

/// 12-digit account number, allocated server-side at registration and
/// immutable afterwards.
///
/// Ordered lexicographically; with a fixed length that matches numeric
/// order, which the storage layer relies on to lock accounts in a stable
/// global order during transfers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNo(String);

impl AccountNo {
    /// Draw a random candidate number, uniform over `[10^11, 10^12)`.
    ///
    /// Uniqueness is the caller's responsibility: candidates are checked
    /// against existing customers and redrawn on collision. The randomness
    /// only keeps collisions rare.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let n: u64 = rng.gen_range(100_000_000_000..1_000_000_000_000);
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNo {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == ACCOUNT_NO_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(DomainError::validation(
                "account_no",
                "must be a 12-digit number",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_twelve_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let acc = AccountNo::generate(&mut rng);
            assert_eq!(acc.as_str().len(), ACCOUNT_NO_LEN);
            assert!(acc.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn parse_accepts_valid_numbers() {
        let acc: AccountNo = "123456789012".parse().unwrap();
        assert_eq!(acc.as_str(), "123456789012");
        assert_eq!(acc.to_string(), "123456789012");
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!("12345678901".parse::<AccountNo>().is_err());
        assert!("1234567890123".parse::<AccountNo>().is_err());
        assert!("12345678901a".parse::<AccountNo>().is_err());
        assert!("".parse::<AccountNo>().is_err());
    }

    #[test]
    fn ordering_matches_numeric_order() {
        let lo: AccountNo = "100000000000".parse().unwrap();
        let hi: AccountNo = "999999999999".parse().unwrap();
        assert!(lo < hi);
    }
}
