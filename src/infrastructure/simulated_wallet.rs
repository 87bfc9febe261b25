use crate::domain::amount::Sats;
use crate::domain::mint::MintUrl;
use crate::domain::ports::WalletClient;
use crate::domain::quote::{MeltOutcome, MeltQuote, QuoteState};
use crate::error::WalletError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// How a simulated melt submission fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeltFailure {
    /// The mint rejects the melt; no funds move.
    Rejected(WalletError),
    /// The mint settles the quote but the response is lost on the way back.
    LostResponse(WalletError),
}

/// Number of calls made against the wallet, per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletCalls {
    pub balances: usize,
    pub quotes: usize,
    pub melts: usize,
    pub status_checks: usize,
}

#[derive(Default)]
struct CallCounters {
    balances: AtomicUsize,
    quotes: AtomicUsize,
    melts: AtomicUsize,
    status_checks: AtomicUsize,
}

/// An in-process wallet with per-mint balances and a scripted mint.
///
/// Every melt quote settles into `settle_state`. Failure injection and an
/// artificial latency let callers exercise the unhappy paths of the
/// orchestrator. Clones share state.
#[derive(Clone)]
pub struct SimulatedWallet {
    balances: Arc<Mutex<BTreeMap<MintUrl, Sats>>>,
    quotes: Arc<Mutex<HashMap<String, MeltQuote>>>,
    calls: Arc<CallCounters>,
    available: Arc<AtomicBool>,
    fee_reserve: Sats,
    fee_charged: Option<Sats>,
    settle_state: QuoteState,
    quote_amount: Option<Sats>,
    latency: Option<Duration>,
    balance_failure: Option<WalletError>,
    quote_failure: Option<WalletError>,
    melt_failure: Option<MeltFailure>,
    status_failure: Option<WalletError>,
}

impl Default for SimulatedWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedWallet {
    pub fn new() -> Self {
        Self {
            balances: Arc::new(Mutex::new(BTreeMap::new())),
            quotes: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(CallCounters::default()),
            available: Arc::new(AtomicBool::new(true)),
            fee_reserve: Sats::ZERO,
            fee_charged: None,
            settle_state: QuoteState::Paid,
            quote_amount: None,
            latency: None,
            balance_failure: None,
            quote_failure: None,
            melt_failure: None,
            status_failure: None,
        }
    }

    pub fn with_fee_reserve(mut self, fee_reserve: Sats) -> Self {
        self.fee_reserve = fee_reserve;
        self
    }

    /// Fee actually taken on settlement; defaults to the whole reserve.
    pub fn with_fee_charged(mut self, fee: Sats) -> Self {
        self.fee_charged = Some(fee);
        self
    }

    pub fn with_settle_state(mut self, state: QuoteState) -> Self {
        self.settle_state = state;
        self
    }

    /// Quotes this amount regardless of what was requested.
    pub fn with_quote_amount(mut self, amount: Sats) -> Self {
        self.quote_amount = Some(amount);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_balance_failure(mut self, error: WalletError) -> Self {
        self.balance_failure = Some(error);
        self
    }

    pub fn with_quote_failure(mut self, error: WalletError) -> Self {
        self.quote_failure = Some(error);
        self
    }

    pub fn with_melt_failure(mut self, failure: MeltFailure) -> Self {
        self.melt_failure = Some(failure);
        self
    }

    pub fn with_status_failure(mut self, error: WalletError) -> Self {
        self.status_failure = Some(error);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Adds `amount` to the balance held at `mint`, as an incoming payment would.
    pub async fn credit(&self, mint: &MintUrl, amount: Sats) {
        let mut balances = self.balances.lock().await;
        let balance = balances.entry(mint.clone()).or_insert(Sats::ZERO);
        *balance = Sats(balance.value().saturating_add(amount.value()));
    }

    pub async fn balance(&self, mint: &MintUrl) -> Sats {
        let balances = self.balances.lock().await;
        balances.get(mint).copied().unwrap_or(Sats::ZERO)
    }

    pub fn calls(&self) -> WalletCalls {
        WalletCalls {
            balances: self.calls.balances.load(Ordering::SeqCst),
            quotes: self.calls.quotes.load(Ordering::SeqCst),
            melts: self.calls.melts.load(Ordering::SeqCst),
            status_checks: self.calls.status_checks.load(Ordering::SeqCst),
        }
    }

    async fn round_trip(&self) -> Result<(), WalletError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(WalletError::Unavailable);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }

    async fn settle(&self, mint: &MintUrl, quote_id: &str) -> Result<MeltQuote, WalletError> {
        let mut quotes = self.quotes.lock().await;
        let quote = quotes
            .get_mut(quote_id)
            .ok_or_else(|| WalletError::Protocol(format!("Unknown quote {quote_id}")))?;

        if quote.state != QuoteState::Unpaid {
            return Err(WalletError::Protocol(format!(
                "Quote {quote_id} already {}",
                quote.state
            )));
        }

        quote.state = self.settle_state.clone();
        if matches!(quote.state, QuoteState::Paid | QuoteState::Pending) {
            let mut balances = self.balances.lock().await;
            let balance = balances.entry(mint.clone()).or_insert(Sats::ZERO);
            let fee = self.fee_charged.unwrap_or(quote.fee_reserve);
            let spent = Sats(quote.amount.value().saturating_add(fee.value()));
            *balance = balance.saturating_sub(spent);
        }
        debug!(quote_id, state = %quote.state, "Simulated melt settled");
        Ok(quote.clone())
    }
}

#[async_trait]
impl WalletClient for SimulatedWallet {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn get_all_balances(&self) -> Result<BTreeMap<MintUrl, Sats>, WalletError> {
        self.calls.balances.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        if let Some(error) = &self.balance_failure {
            return Err(error.clone());
        }
        Ok(self.balances.lock().await.clone())
    }

    async fn request_melt_quote(
        &self,
        mint: &MintUrl,
        address: &str,
        amount_msat: u64,
    ) -> Result<MeltQuote, WalletError> {
        self.calls.quotes.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        if let Some(error) = &self.quote_failure {
            return Err(error.clone());
        }
        if !address.contains('@') {
            return Err(WalletError::Protocol(format!(
                "Invalid Lightning address: {address}"
            )));
        }

        let id = Uuid::new_v4().simple().to_string();
        let quote = MeltQuote {
            request: format!("lnsim{amount_msat}1{id}"),
            amount: self.quote_amount.unwrap_or(Sats(amount_msat / 1000)),
            fee_reserve: self.fee_reserve,
            state: QuoteState::Unpaid,
            id: id.clone(),
        };
        debug!(mint = %mint, quote_id = %id, "Simulated melt quote issued");
        self.quotes.lock().await.insert(id, quote.clone());
        Ok(quote)
    }

    async fn melt(&self, mint: &MintUrl, quote_id: &str) -> Result<MeltOutcome, WalletError> {
        self.calls.melts.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        match &self.melt_failure {
            Some(MeltFailure::Rejected(error)) => return Err(error.clone()),
            Some(MeltFailure::LostResponse(error)) => {
                self.settle(mint, quote_id).await?;
                return Err(error.clone());
            }
            None => {}
        }

        let quote = self.settle(mint, quote_id).await?;
        let paid = quote.state == QuoteState::Paid;
        Ok(MeltOutcome {
            fee_paid: paid.then_some(self.fee_charged.unwrap_or(quote.fee_reserve)),
            state: quote.state,
        })
    }

    async fn check_melt_quote(
        &self,
        _mint: &MintUrl,
        quote_id: &str,
    ) -> Result<MeltQuote, WalletError> {
        self.calls.status_checks.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        if let Some(error) = &self.status_failure {
            return Err(error.clone());
        }
        self.quotes
            .lock()
            .await
            .get(quote_id)
            .cloned()
            .ok_or_else(|| WalletError::Protocol(format!("Unknown quote {quote_id}")))
    }
}
