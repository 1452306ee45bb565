//! Integer money amounts.
//!
//! All amounts are whole currency units (VND has no minor unit in practice).
//! Floating point never appears in money paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Zero units.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw unit count.
    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Returns the raw unit count.
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|a| a.0).sum())
    }
}

/// Formats with `,` thousands separators, e.g. `1,000,000`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{grouped}")
        } else {
            write!(f, "{grouped}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_display_groups_thousands() {
        assert_eq!(Amount::new(0).to_string(), "0");
        assert_eq!(Amount::new(999).to_string(), "999");
        assert_eq!(Amount::new(1_000).to_string(), "1,000");
        assert_eq!(Amount::new(1_000_000).to_string(), "1,000,000");
        assert_eq!(Amount::new(-12_345_678).to_string(), "-12,345,678");
    }

    #[test]
    fn test_amount_is_positive() {
        assert!(Amount::new(1).is_positive());
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::new(-5).is_positive());
    }

    #[test]
    fn test_amount_sum_and_checked_add() {
        let total: Amount = [Amount::new(600_000), Amount::new(400_000)].into_iter().sum();
        assert_eq!(total, Amount::new(1_000_000));
        assert_eq!(Amount::new(i64::MAX).checked_add(Amount::new(1)), None);
    }

    #[test]
    fn test_amount_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Amount::new(42)).unwrap(), "42");
        let parsed: Amount = serde_json::from_str("1500000").unwrap();
        assert_eq!(parsed.units(), 1_500_000);
    }
}
