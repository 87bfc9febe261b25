use crate::domain::amount::Sats;
use std::time::Duration;
use thiserror::Error;

/// Failure kinds reported by a [`WalletClient`](crate::domain::ports::WalletClient) call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet not initialized")]
    Unavailable,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Wallet call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum AutoWithdrawError {
    #[error("Wallet not initialized")]
    WalletUnavailable,
    #[error("Quote request failed: {0}")]
    QuoteRequestFailed(#[source] WalletError),
    #[error(
        "Insufficient balance for withdrawal + fees (need {required}, have {available})"
    )]
    InsufficientBalance { required: Sats, available: Sats },
    #[error("Melt execution failed: {0}")]
    MeltExecutionFailed(#[source] WalletError),
    #[error("Quote status check failed: {0}")]
    QuoteStatusFailed(#[source] WalletError),
    #[error("Payment failed: Quote state is UNPAID")]
    QuoteUnpaid,
    #[error("Payment failed: Unknown quote state {0}")]
    UnknownQuoteState(String),
    #[error("Withdrawal cancelled before completion")]
    Cancelled,
    #[error("Withdrawal interrupted after the payment was sent; outcome unconfirmed")]
    Unconfirmed,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, AutoWithdrawError>;
