use super::amount::Sats;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Settlement state of a melt quote as reported by the mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuoteState {
    Unpaid,
    Pending,
    Paid,
    /// Anything the mint reports that this client does not know about.
    Unknown(String),
}

impl FromStr for QuoteState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Self::Unpaid,
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            _ => Self::Unknown(s.trim().to_string()),
        })
    }
}

impl From<String> for QuoteState {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<QuoteState> for String {
    fn from(state: QuoteState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for QuoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => f.write_str("UNPAID"),
            Self::Pending => f.write_str("PENDING"),
            Self::Paid => f.write_str("PAID"),
            Self::Unknown(other) => f.write_str(other),
        }
    }
}

/// A mint-issued price quote for paying `request` out of the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuote {
    pub id: String,
    pub amount: Sats,
    pub fee_reserve: Sats,
    /// The payment request (BOLT11 invoice) the quote pays.
    pub request: String,
    pub state: QuoteState,
}

impl MeltQuote {
    pub fn total_required(&self) -> crate::error::Result<Sats> {
        self.amount.checked_add(self.fee_reserve)
    }
}

/// Result of submitting a melt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltOutcome {
    pub state: QuoteState,
    /// Fee the mint actually charged, once known. Usually below the reserve.
    pub fee_paid: Option<Sats>,
}
