use super::amount::Sats;
use super::mint::MintUrl;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_THRESHOLD: Sats = Sats(1_000);
pub const MAX_THRESHOLD: Sats = Sats(1_000_000);
pub const DEFAULT_THRESHOLD: Sats = Sats(10_000);
pub const MIN_WITHDRAW_PERCENTAGE: u8 = 90;
pub const MAX_WITHDRAW_PERCENTAGE: u8 = 98;
/// Leaves a 5% buffer on the mint for fees.
pub const DEFAULT_WITHDRAW_PERCENTAGE: u8 = 95;

pub fn clamp_threshold(threshold: Sats) -> Sats {
    threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

pub fn clamp_percentage(percentage: u8) -> u8 {
    percentage.clamp(MIN_WITHDRAW_PERCENTAGE, MAX_WITHDRAW_PERCENTAGE)
}

/// Auto-withdrawal configuration of a single mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintWithdrawSettings {
    pub mint: MintUrl,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_threshold")]
    pub threshold: Sats,
    #[serde(default = "default_percentage")]
    pub percentage: u8,
    /// Lightning address the withdrawal is paid to. Empty disables the mint.
    #[serde(default)]
    pub address: String,
}

fn default_threshold() -> Sats {
    DEFAULT_THRESHOLD
}

fn default_percentage() -> u8 {
    DEFAULT_WITHDRAW_PERCENTAGE
}

impl MintWithdrawSettings {
    /// Settings for `mint` seeded from `defaults`, disabled until the operator
    /// turns them on.
    pub fn seeded(mint: MintUrl, defaults: &WithdrawDefaults) -> Self {
        Self {
            mint,
            enabled: false,
            threshold: defaults.threshold,
            percentage: defaults.percentage,
            address: defaults.address.clone(),
        }
        .clamped()
    }

    /// Returns a copy with threshold and percentage forced into range.
    pub fn clamped(mut self) -> Self {
        self.threshold = clamp_threshold(self.threshold);
        self.percentage = clamp_percentage(self.percentage);
        self
    }

    pub fn has_address(&self) -> bool {
        !self.address.trim().is_empty()
    }
}

/// Process-wide defaults used to seed settings for mints that have none yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawDefaults {
    #[serde(default = "default_threshold")]
    pub threshold: Sats,
    #[serde(default = "default_percentage")]
    pub percentage: u8,
    #[serde(default)]
    pub address: String,
}

impl Default for WithdrawDefaults {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            percentage: DEFAULT_WITHDRAW_PERCENTAGE,
            address: String::new(),
        }
    }
}

/// The full auto-withdrawal configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoWithdrawSettings {
    #[serde(default)]
    pub global_enabled: bool,
    #[serde(default)]
    pub defaults: WithdrawDefaults,
    #[serde(default)]
    pub mints: BTreeMap<MintUrl, MintWithdrawSettings>,
}

impl AutoWithdrawSettings {
    /// Settings for `mint`, falling back to seeded defaults.
    pub fn mint_settings(&self, mint: &MintUrl) -> MintWithdrawSettings {
        self.mints
            .get(mint)
            .cloned()
            .unwrap_or_else(|| MintWithdrawSettings::seeded(mint.clone(), &self.defaults))
    }

    pub fn upsert(&mut self, settings: MintWithdrawSettings) {
        let settings = settings.clamped();
        self.mints.insert(settings.mint.clone(), settings);
    }

    /// Forces every stored value into its valid range and re-keys entries by
    /// the mint they describe.
    pub fn normalized(mut self) -> Self {
        self.defaults.threshold = clamp_threshold(self.defaults.threshold);
        self.defaults.percentage = clamp_percentage(self.defaults.percentage);
        self.mints = self
            .mints
            .into_values()
            .map(|settings| {
                let settings = settings.clamped();
                (settings.mint.clone(), settings)
            })
            .collect();
        self
    }
}
