//! Whole-collection JSON persistence shared by the ledger and payment history.

use crate::domain::ports::KeyValueStore;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

/// Reads the list stored under `key`. A missing blob is an empty list; an
/// unreadable one is logged and treated as empty.
pub(crate) async fn read_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>> {
    let Some(bytes) = store.get(key).await? else {
        return Ok(Vec::new());
    };
    match serde_json::from_slice(&bytes) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            error!(key, error = %err, "Discarding unreadable history blob");
            Ok(Vec::new())
        }
    }
}

pub(crate) async fn write_list<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    entries: &[T],
) -> Result<()> {
    let bytes = serde_json::to_vec(entries)?;
    store.put(key, bytes).await
}
