use crate::domain::ports::KeyValueStore;
use crate::error::{AutoWithdrawError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding every auto-withdrawal blob.
pub const CF_AUTO_WITHDRAW: &str = "auto_withdraw";

/// A persistent key-value store backed by RocksDB.
///
/// All blobs (withdrawal history, payment history, settings) live in a single
/// column family keyed by their fixed key.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the `auto_withdraw` column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_AUTO_WITHDRAW, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf() -> AutoWithdrawError {
        AutoWithdrawError::InternalError(Box::new(std::io::Error::other(
            "Auto-withdraw column family not found",
        )))
    }
}

#[async_trait]
impl KeyValueStore for RocksDBStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(CF_AUTO_WITHDRAW)
            .ok_or_else(Self::missing_cf)?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_AUTO_WITHDRAW)
            .ok_or_else(Self::missing_cf)?;
        self.db.put_cf(cf, key.as_bytes(), value)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_AUTO_WITHDRAW)
            .ok_or_else(Self::missing_cf)?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }
}
