use std::time::Duration;

pub const DEFAULT_WALLET_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Upper bounds for each wallet round trip.
///
/// An unresponsive mint would otherwise hold the single in-flight slot
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletTimeouts {
    pub balances: Duration,
    pub quote: Duration,
    pub melt: Duration,
    pub status: Duration,
}

impl WalletTimeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            balances: timeout,
            quote: timeout,
            melt: timeout,
            status: timeout,
        }
    }
}

impl Default for WalletTimeouts {
    fn default() -> Self {
        Self::uniform(DEFAULT_WALLET_TIMEOUT)
    }
}

/// Runtime configuration of the [`AutoWithdrawService`](crate::application::service::AutoWithdrawService).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub timeouts: WalletTimeouts,
    /// Events buffered per subscriber before a slow one starts missing them.
    pub event_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeouts: WalletTimeouts::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
