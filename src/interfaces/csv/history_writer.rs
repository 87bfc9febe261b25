use crate::domain::withdrawal::WithdrawalAttempt;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct HistoryRow<'a> {
    id: String,
    timestamp: String,
    mint: &'a str,
    address: &'a str,
    amount: u64,
    fee: u64,
    status: String,
    quote_id: &'a str,
    error: &'a str,
}

impl<'a> From<&'a WithdrawalAttempt> for HistoryRow<'a> {
    fn from(attempt: &'a WithdrawalAttempt) -> Self {
        Self {
            id: attempt.id.to_string(),
            timestamp: attempt.timestamp.to_rfc3339(),
            mint: attempt.mint.as_str(),
            address: &attempt.address,
            amount: attempt.amount.value(),
            fee: attempt.fee.value(),
            status: attempt.status.to_string(),
            quote_id: attempt.quote_id.as_deref().unwrap_or_default(),
            error: attempt.error_message.as_deref().unwrap_or_default(),
        }
    }
}

/// Writes withdrawal attempts as CSV, one row per attempt in the given order.
pub struct HistoryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> HistoryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_attempts<'a, I>(&mut self, attempts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a WithdrawalAttempt>,
    {
        let mut wrote_any = false;
        for attempt in attempts {
            self.writer.serialize(HistoryRow::from(attempt))?;
            wrote_any = true;
        }
        if !wrote_any {
            // Header only, so an empty history is still a valid CSV.
            self.writer.write_record([
                "id", "timestamp", "mint", "address", "amount", "fee", "status", "quote_id",
                "error",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
