use super::blob::{read_list, write_list};
use crate::domain::payment_history::{PaymentHistoryEntry, PaymentStatus};
use crate::domain::ports::KeyValueStoreRef;
use crate::error::Result;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

pub const PAYMENT_HISTORY_KEY: &str = "payment_history";

/// The application's unified payment history, where withdrawals are mirrored
/// next to incoming payments.
pub struct PaymentHistory {
    store: KeyValueStoreRef,
    write_lock: Mutex<()>,
}

impl PaymentHistory {
    pub fn new(store: KeyValueStoreRef) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn add(&self, entry: PaymentHistoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut history: Vec<PaymentHistoryEntry> =
            read_list(self.store.as_ref(), PAYMENT_HISTORY_KEY).await?;
        history.push(entry);
        write_list(self.store.as_ref(), PAYMENT_HISTORY_KEY, &history).await
    }

    /// Returns `false` when no entry with `id` exists.
    pub async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut history: Vec<PaymentHistoryEntry> =
            read_list(self.store.as_ref(), PAYMENT_HISTORY_KEY).await?;
        let Some(entry) = history.iter_mut().find(|entry| entry.id == id) else {
            warn!(%id, "Payment history entry to update not found");
            return Ok(false);
        };
        entry.status = status;
        write_list(self.store.as_ref(), PAYMENT_HISTORY_KEY, &history).await?;
        Ok(true)
    }

    pub async fn list(&self) -> Result<Vec<PaymentHistoryEntry>> {
        read_list(self.store.as_ref(), PAYMENT_HISTORY_KEY).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<PaymentHistoryEntry>> {
        Ok(self.list().await?.into_iter().find(|entry| entry.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::Sats;
    use crate::domain::mint::MintUrl;
    use crate::domain::quote::{MeltQuote, QuoteState};
    use crate::domain::withdrawal::WithdrawalAttempt;
    use crate::infrastructure::in_memory::InMemoryKeyValueStore;
    use std::sync::Arc;

    fn entry() -> PaymentHistoryEntry {
        let attempt = WithdrawalAttempt::new(
            MintUrl::new("https://a.example").unwrap(),
            "a@ln.example",
            Sats(9_500),
        );
        let quote = MeltQuote {
            id: "q1".to_string(),
            amount: Sats(9_500),
            fee_reserve: Sats(50),
            request: "lnbc1".to_string(),
            state: QuoteState::Unpaid,
        };
        PaymentHistoryEntry::withdrawal(&attempt, &quote)
    }

    #[tokio::test]
    async fn test_update_status_in_place() {
        let history = PaymentHistory::new(Arc::new(InMemoryKeyValueStore::new()));
        let entry = entry();
        history.add(entry.clone()).await.unwrap();

        assert!(
            history
                .update_status(entry.id, PaymentStatus::Completed)
                .await
                .unwrap()
        );
        let stored = history.get(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_entry_is_reported() {
        let history = PaymentHistory::new(Arc::new(InMemoryKeyValueStore::new()));
        assert!(
            !history
                .update_status(Uuid::new_v4(), PaymentStatus::Failed)
                .await
                .unwrap()
        );
    }
}
