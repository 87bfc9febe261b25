use crate::domain::amount::Sats;
use crate::domain::ports::{KeyValueStoreRef, SettingsStore};
use crate::domain::settings::{
    AutoWithdrawSettings, MintWithdrawSettings, clamp_percentage, clamp_threshold,
};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

pub const SETTINGS_KEY: &str = "auto_withdraw.settings";

/// Settings persisted as one JSON document in a [`KeyValueStore`](crate::domain::ports::KeyValueStore).
///
/// Values are clamped into range both when written and when read back, so a
/// hand-edited blob can never hand the policy an out-of-range threshold.
pub struct KvSettingsStore {
    store: KeyValueStoreRef,
    write_lock: Mutex<()>,
}

impl KvSettingsStore {
    pub fn new(store: KeyValueStoreRef) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Overwrites the whole document, e.g. when seeding from a config file.
    pub async fn replace(&self, settings: AutoWithdrawSettings) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(settings).await
    }

    async fn read(&self) -> Result<AutoWithdrawSettings> {
        let Some(bytes) = self.store.get(SETTINGS_KEY).await? else {
            return Ok(AutoWithdrawSettings::default());
        };
        match serde_json::from_slice::<AutoWithdrawSettings>(&bytes) {
            Ok(settings) => Ok(settings.normalized()),
            Err(error) => {
                warn!(%error, "Stored auto-withdraw settings are unreadable, using defaults");
                Ok(AutoWithdrawSettings::default())
            }
        }
    }

    async fn write(&self, settings: AutoWithdrawSettings) -> Result<()> {
        let bytes = serde_json::to_vec(&settings.normalized())?;
        self.store.put(SETTINGS_KEY, bytes).await
    }

    async fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut AutoWithdrawSettings) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.read().await?;
        apply(&mut settings);
        self.write(settings).await
    }
}

#[async_trait]
impl SettingsStore for KvSettingsStore {
    async fn load(&self) -> Result<AutoWithdrawSettings> {
        self.read().await
    }

    async fn save_mint_settings(&self, settings: MintWithdrawSettings) -> Result<()> {
        self.update(|all| all.upsert(settings)).await
    }

    async fn set_global_enabled(&self, enabled: bool) -> Result<()> {
        self.update(|all| all.global_enabled = enabled).await
    }

    async fn set_default_threshold(&self, threshold: Sats) -> Result<()> {
        self.update(|all| all.defaults.threshold = clamp_threshold(threshold))
            .await
    }

    async fn set_default_percentage(&self, percentage: u8) -> Result<()> {
        self.update(|all| all.defaults.percentage = clamp_percentage(percentage))
            .await
    }

    async fn set_default_address(&self, address: String) -> Result<()> {
        self.update(|all| all.defaults.address = address).await
    }
}
