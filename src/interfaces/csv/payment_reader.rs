use crate::domain::amount::Sats;
use crate::domain::mint::MintUrl;
use crate::error::{AutoWithdrawError, Result};
use serde::Deserialize;
use std::io::Read;

/// An incoming payment credited to one mint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentEvent {
    pub mint: MintUrl,
    pub amount: Sats,
}

/// Reads `mint,amount` payment records from a CSV source.
///
/// Whitespace around fields is trimmed and extra columns are tolerated.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes payments; a malformed row yields an error and the
    /// stream carries on.
    pub fn payments(self) -> impl Iterator<Item = Result<PaymentEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AutoWithdrawError::from))
    }
}
