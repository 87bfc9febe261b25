use crate::domain::balance::MintBalanceSnapshot;
use crate::domain::ports::WalletClientRef;
use crate::error::WalletError;
use std::time::Duration;
use tracing::{debug, error};

/// Takes point-in-time snapshots of every mint balance held by the wallet.
pub struct BalanceAggregator {
    wallet: WalletClientRef,
    timeout: Duration,
}

impl BalanceAggregator {
    pub fn new(wallet: WalletClientRef, timeout: Duration) -> Self {
        Self { wallet, timeout }
    }

    /// Never fails: any wallet error is logged and yields an empty snapshot,
    /// which selects no mint downstream.
    pub async fn snapshot(&self) -> MintBalanceSnapshot {
        let result = match tokio::time::timeout(self.timeout, self.wallet.get_all_balances()).await
        {
            Ok(result) => result,
            Err(_) => Err(WalletError::Timeout(self.timeout)),
        };

        match result {
            Ok(balances) => {
                debug!(mints = balances.len(), "Retrieved mint balances");
                MintBalanceSnapshot::new(balances)
            }
            Err(error) => {
                error!(%error, "Failed to read mint balances");
                MintBalanceSnapshot::empty()
            }
        }
    }
}
