use super::amount::Sats;
use super::mint::MintUrl;
use super::quote::{MeltOutcome, MeltQuote};
use super::settings::{AutoWithdrawSettings, MintWithdrawSettings};
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The wallet's balance and payment primitives.
///
/// Implementations are shared singletons and are expected to serialize
/// conflicting balance-mutating operations internally.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Whether a wallet instance exists at all. A check cycle is aborted when
    /// this is false.
    fn is_available(&self) -> bool {
        true
    }

    async fn get_all_balances(&self) -> std::result::Result<BTreeMap<MintUrl, Sats>, WalletError>;

    /// Requests a melt quote paying `amount_msat` to a Lightning address.
    async fn request_melt_quote(
        &self,
        mint: &MintUrl,
        address: &str,
        amount_msat: u64,
    ) -> std::result::Result<MeltQuote, WalletError>;

    async fn melt(&self, mint: &MintUrl, quote_id: &str)
    -> std::result::Result<MeltOutcome, WalletError>;

    async fn check_melt_quote(
        &self,
        mint: &MintUrl,
        quote_id: &str,
    ) -> std::result::Result<MeltQuote, WalletError>;
}

/// Byte-blob storage addressed by fixed string keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Global and per-mint auto-withdrawal configuration.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<AutoWithdrawSettings>;
    async fn save_mint_settings(&self, settings: MintWithdrawSettings) -> Result<()>;
    async fn set_global_enabled(&self, enabled: bool) -> Result<()>;
    async fn set_default_threshold(&self, threshold: Sats) -> Result<()>;
    async fn set_default_percentage(&self, percentage: u8) -> Result<()>;
    async fn set_default_address(&self, address: String) -> Result<()>;

    async fn mint_settings(&self, mint: &MintUrl) -> Result<MintWithdrawSettings> {
        Ok(self.load().await?.mint_settings(mint))
    }

    async fn is_enabled_for_mint(&self, mint: &MintUrl) -> Result<bool> {
        let settings = self.load().await?;
        Ok(settings.global_enabled && settings.mint_settings(mint).enabled)
    }
}

pub type WalletClientRef = Arc<dyn WalletClient>;
pub type KeyValueStoreRef = Arc<dyn KeyValueStore>;
pub type SettingsStoreRef = Arc<dyn SettingsStore>;
