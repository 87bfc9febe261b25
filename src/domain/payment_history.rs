use super::mint::MintUrl;
use super::quote::MeltQuote;
use super::withdrawal::{WithdrawalAttempt, WithdrawalStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl From<WithdrawalStatus> for PaymentStatus {
    fn from(status: WithdrawalStatus) -> Self {
        match status {
            WithdrawalStatus::Pending => Self::Pending,
            WithdrawalStatus::Completed => Self::Completed,
            WithdrawalStatus::Failed => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cashu,
    Lightning,
}

/// An entry of the application's unified payment history.
///
/// Incoming payments have a positive amount; withdrawals are mirrored here
/// with a negative amount and share the id of their [`WithdrawalAttempt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub id: Uuid,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub unit: String,
    pub mint: MintUrl,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightning_invoice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightning_quote_id: Option<String>,
}

impl PaymentHistoryEntry {
    /// Outgoing, pending entry for a withdrawal about to be paid with `quote`.
    pub fn withdrawal(attempt: &WithdrawalAttempt, quote: &MeltQuote) -> Self {
        let amount = i64::try_from(attempt.amount.value()).unwrap_or(i64::MAX);
        Self {
            id: attempt.id,
            amount: -amount,
            date: Utc::now(),
            unit: "sat".to_string(),
            mint: attempt.mint.clone(),
            status: PaymentStatus::Pending,
            payment_type: PaymentType::Lightning,
            lightning_invoice: Some(quote.request.clone()),
            lightning_quote_id: Some(quote.id.clone()),
        }
    }
}
