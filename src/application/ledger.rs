use super::blob::{read_list, write_list};
use crate::domain::ports::KeyValueStoreRef;
use crate::domain::withdrawal::WithdrawalAttempt;
use crate::error::Result;
use tokio::sync::Mutex;
use tracing::debug;

pub const HISTORY_KEY: &str = "auto_withdraw.history";
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Bounded, newest-first history of finished withdrawal attempts.
///
/// Every mutation rewrites the whole collection under [`HISTORY_KEY`]; the
/// cap keeps that cheap.
pub struct WithdrawalLedger {
    store: KeyValueStoreRef,
    write_lock: Mutex<()>,
}

impl WithdrawalLedger {
    pub fn new(store: KeyValueStoreRef) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Inserts `attempt` at the head, evicting the oldest entries past capacity.
    pub async fn append(&self, attempt: WithdrawalAttempt) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut history: Vec<WithdrawalAttempt> =
            read_list(self.store.as_ref(), HISTORY_KEY).await?;
        history.insert(0, attempt);
        if history.len() > MAX_HISTORY_ENTRIES {
            let evicted = history.len() - MAX_HISTORY_ENTRIES;
            history.truncate(MAX_HISTORY_ENTRIES);
            debug!(evicted, "Evicted oldest withdrawal history entries");
        }
        write_list(self.store.as_ref(), HISTORY_KEY, &history).await
    }

    /// All recorded attempts, newest first.
    pub async fn list(&self) -> Result<Vec<WithdrawalAttempt>> {
        read_list(self.store.as_ref(), HISTORY_KEY).await
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(HISTORY_KEY).await
    }
}
