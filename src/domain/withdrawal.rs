use super::amount::Sats;
use super::mint::MintUrl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const PENDING_MESSAGE: &str = "Payment pending - check back later";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Where a withdrawal attempt currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WithdrawalPhase {
    #[default]
    Idle,
    Preparing,
    QuoteRequested,
    Validating,
    Executing,
    Polling,
    Completed,
    Pending,
    Failed,
}

impl WithdrawalPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Pending | Self::Failed)
    }
}

/// One auto-withdrawal attempt, as recorded in the withdrawal ledger.
///
/// Only the orchestrator mutates an attempt; once appended to the ledger it is
/// never changed again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalAttempt {
    pub id: Uuid,
    pub mint: MintUrl,
    pub address: String,
    pub amount: Sats,
    pub fee: Sats,
    pub status: WithdrawalStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
}

impl WithdrawalAttempt {
    pub fn new(mint: MintUrl, address: impl Into<String>, amount: Sats) -> Self {
        Self {
            id: Uuid::new_v4(),
            mint,
            address: address.into(),
            amount,
            fee: Sats::ZERO,
            status: WithdrawalStatus::Pending,
            timestamp: Utc::now(),
            error_message: None,
            quote_id: None,
        }
    }

    pub fn record_quote(&mut self, quote_id: impl Into<String>, fee_reserve: Sats) {
        self.quote_id = Some(quote_id.into());
        self.fee = fee_reserve;
    }

    pub fn complete(&mut self) {
        self.status = WithdrawalStatus::Completed;
        self.error_message = None;
    }

    pub fn leave_pending(&mut self) {
        self.status = WithdrawalStatus::Pending;
        self.error_message = Some(PENDING_MESSAGE.to_string());
    }

    /// The payment may or may not have gone through; keep it pending with
    /// `message` explaining why.
    pub fn leave_unconfirmed(&mut self, message: impl Into<String>) {
        self.status = WithdrawalStatus::Pending;
        self.error_message = Some(message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = WithdrawalStatus::Failed;
        self.error_message = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_lifecycle() {
        let mint = MintUrl::new("https://a.example").unwrap();
        let mut attempt = WithdrawalAttempt::new(mint, "a@ln.example", Sats(9_500));
        assert_eq!(attempt.status, WithdrawalStatus::Pending);
        assert_eq!(attempt.fee, Sats::ZERO);

        attempt.record_quote("q1", Sats(50));
        attempt.complete();
        assert_eq!(attempt.status, WithdrawalStatus::Completed);
        assert_eq!(attempt.fee, Sats(50));
        assert_eq!(attempt.quote_id.as_deref(), Some("q1"));
    }

    #[test]
    fn test_attempt_serializes_lowercase_status() {
        let mint = MintUrl::new("https://a.example").unwrap();
        let mut attempt = WithdrawalAttempt::new(mint, "a@ln.example", Sats(1_000));
        attempt.fail("boom");

        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_message"], "boom");
        assert!(json.get("quote_id").is_none());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(WithdrawalPhase::Pending.is_terminal());
        assert!(!WithdrawalPhase::Executing.is_terminal());
        assert!(!WithdrawalPhase::Idle.is_terminal());
    }
}
