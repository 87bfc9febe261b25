use super::amount::Sats;
use super::mint::MintUrl;
use std::collections::BTreeMap;

/// Balances of every mint in the wallet, read in one wallet call.
///
/// The snapshot is immutable once built. Iteration order is the mint URL
/// order of the underlying map; callers must not rely on it for anything
/// other than determinism.
#[derive(Debug, Clone, PartialEq)]
pub struct MintBalanceSnapshot {
    balances: BTreeMap<MintUrl, Sats>,
}

impl MintBalanceSnapshot {
    pub fn new(balances: BTreeMap<MintUrl, Sats>) -> Self {
        Self { balances }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn get(&self, mint: &MintUrl) -> Option<Sats> {
        self.balances.get(mint).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MintUrl, Sats)> {
        self.balances.iter().map(|(mint, balance)| (mint, *balance))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl FromIterator<(MintUrl, Sats)> for MintBalanceSnapshot {
    fn from_iter<I: IntoIterator<Item = (MintUrl, Sats)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
