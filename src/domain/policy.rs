//! Threshold policy: decides whether a mint should be drained and by how much.
//!
//! Everything in here is pure. Settings resolution is passed in as a closure so
//! one check cycle sees a single consistent view of the configuration.

use super::amount::Sats;
use super::balance::MintBalanceSnapshot;
use super::mint::MintUrl;
use super::settings::MintWithdrawSettings;
use tracing::debug;

/// A mint selected for withdrawal in one check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalCandidate {
    pub mint: MintUrl,
    /// Balance observed in the snapshot; the withdrawal amount is derived from it.
    pub balance: Sats,
    pub settings: MintWithdrawSettings,
}

impl WithdrawalCandidate {
    pub fn amount(&self) -> Sats {
        compute_amount(self.balance, &self.settings)
    }
}

pub fn should_trigger(balance: Sats, settings: &MintWithdrawSettings, global_enabled: bool) -> bool {
    global_enabled && settings.enabled && settings.has_address() && balance >= settings.threshold
}

/// `floor(balance * percentage / 100)`.
pub fn compute_amount(balance: Sats, settings: &MintWithdrawSettings) -> Sats {
    balance.percent(settings.percentage)
}

/// Picks at most one mint to withdraw from.
///
/// The priority mint (the one that just received a payment) is evaluated
/// first. If it does not trigger, the remaining mints are evaluated in
/// snapshot order and the first that triggers wins. Evaluation stops at the
/// first match.
pub fn select_candidate<F>(
    snapshot: &MintBalanceSnapshot,
    priority: Option<&MintUrl>,
    global_enabled: bool,
    mut settings_for: F,
) -> Option<WithdrawalCandidate>
where
    F: FnMut(&MintUrl) -> MintWithdrawSettings,
{
    let mut evaluate = |mint: &MintUrl, balance: Sats| {
        let settings = settings_for(mint);
        if should_trigger(balance, &settings, global_enabled) {
            Some(WithdrawalCandidate {
                mint: mint.clone(),
                balance,
                settings,
            })
        } else {
            debug!(mint = %mint, balance = %balance, "Mint did not trigger withdrawal");
            None
        }
    };

    if let Some(priority) = priority {
        match snapshot.get(priority) {
            Some(balance) => {
                if let Some(candidate) = evaluate(priority, balance) {
                    return Some(candidate);
                }
            }
            None => debug!(mint = %priority, "Priority mint not present in balance snapshot"),
        }
    }

    snapshot
        .iter()
        .filter(|(mint, _)| Some(*mint) != priority)
        .find_map(|(mint, balance)| evaluate(mint, balance))
}
