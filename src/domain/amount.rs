use crate::error::{AutoWithdrawError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount in the wallet's smallest unit (satoshis).
///
/// There are no operator impls: arithmetic goes through the checked and
/// saturating helpers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sats(pub u64);

impl Sats {
    pub const ZERO: Self = Self(0);

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Converts to millisatoshis, the unit melt quotes are requested in.
    pub fn to_msat(self) -> Result<u64> {
        self.0.checked_mul(1000).ok_or_else(|| {
            AutoWithdrawError::ValidationError(format!("{self} does not fit in msat"))
        })
    }

    /// `floor(self * percentage / 100)`.
    pub fn percent(self, percentage: u8) -> Self {
        let scaled = u128::from(self.0) * u128::from(percentage) / 100;
        // percentage <= 100 in every caller, so the result never exceeds self
        Self(u64::try_from(scaled).unwrap_or(u64::MAX))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| AutoWithdrawError::ValidationError("Amount overflow".to_string()))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Sats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sats", self.0)
    }
}
