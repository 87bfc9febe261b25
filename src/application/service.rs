use super::aggregator::BalanceAggregator;
use super::ledger::WithdrawalLedger;
use super::notifier::{ProgressNotifier, Subscription};
use super::orchestrator::WithdrawalOrchestrator;
use super::payment_history::PaymentHistory;
use super::single_flight::InFlightClaim;
use crate::config::ServiceConfig;
use crate::domain::mint::MintUrl;
use crate::domain::payment_history::PaymentHistoryEntry;
use crate::domain::policy;
use crate::domain::ports::{KeyValueStoreRef, SettingsStoreRef, WalletClientRef};
use crate::domain::withdrawal::{WithdrawalAttempt, WithdrawalPhase};
use crate::error::{AutoWithdrawError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// How a check cycle ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Another withdrawal held the in-flight slot; nothing was done.
    AlreadyInFlight,
    /// The service was shut down; nothing was done.
    ShuttingDown,
    GloballyDisabled,
    /// The balance snapshot came back empty.
    NoBalances,
    /// No mint met its threshold.
    NoCandidate,
    /// An attempt ran; its status tells how it ended.
    Withdrawn(WithdrawalAttempt),
}

struct Inner {
    wallet: WalletClientRef,
    settings: SettingsStoreRef,
    aggregator: BalanceAggregator,
    orchestrator: WithdrawalOrchestrator,
    ledger: Arc<WithdrawalLedger>,
    payments: Arc<PaymentHistory>,
    notifier: ProgressNotifier,
    in_flight: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl Inner {
    async fn check_and_trigger(&self, priority: Option<&MintUrl>) -> Result<CheckOutcome> {
        if *self.shutdown.borrow() {
            debug!("Auto-withdraw service is shut down, skipping check");
            return Ok(CheckOutcome::ShuttingDown);
        }

        // Claimed before any wallet call, so a dropped trigger costs nothing.
        let Some(claim) = InFlightClaim::try_claim(&self.in_flight) else {
            debug!("Auto-withdrawal already in progress, skipping check");
            return Ok(CheckOutcome::AlreadyInFlight);
        };

        let settings = self.settings.load().await?;
        if !settings.global_enabled {
            debug!("Auto-withdrawal disabled globally");
            return Ok(CheckOutcome::GloballyDisabled);
        }

        if !self.wallet.is_available() {
            return Err(AutoWithdrawError::WalletUnavailable);
        }

        let snapshot = self.aggregator.snapshot().await;
        if snapshot.is_empty() {
            warn!("No mint balances available, skipping auto-withdrawal check");
            return Ok(CheckOutcome::NoBalances);
        }

        let candidate = policy::select_candidate(
            &snapshot,
            priority,
            settings.global_enabled,
            |mint| settings.mint_settings(mint),
        );
        let Some(candidate) = candidate else {
            debug!(mints = snapshot.len(), "No mint met its withdrawal threshold");
            return Ok(CheckOutcome::NoCandidate);
        };

        let attempt = self.orchestrator.execute(&claim, candidate).await;
        Ok(CheckOutcome::Withdrawn(attempt))
    }
}

/// Application-scoped entry point of the auto-withdrawal engine.
///
/// Triggers are fire-and-forget: [`on_payment_completed`](Self::on_payment_completed)
/// spawns the check cycle on the runtime captured at construction, so it is
/// not tied to whatever screen reported the payment. At most one withdrawal
/// runs at a time across all triggers. Dropping the service aborts any cycle
/// still running; [`shutdown`](Self::shutdown) lets them wind down instead.
pub struct AutoWithdrawService {
    inner: Arc<Inner>,
    tasks: Mutex<JoinSet<()>>,
    runtime: Handle,
    shutdown: watch::Sender<bool>,
}

impl AutoWithdrawService {
    /// Must be called from within a tokio runtime.
    pub fn new(
        wallet: WalletClientRef,
        store: KeyValueStoreRef,
        settings: SettingsStoreRef,
        config: ServiceConfig,
    ) -> Result<Self> {
        let runtime =
            Handle::try_current().map_err(|err| AutoWithdrawError::InternalError(Box::new(err)))?;

        let ledger = Arc::new(WithdrawalLedger::new(store.clone()));
        let payments = Arc::new(PaymentHistory::new(store));
        let notifier = ProgressNotifier::new(config.event_capacity);
        let (shutdown, cancel) = watch::channel(false);

        let orchestrator = WithdrawalOrchestrator::new(
            wallet.clone(),
            ledger.clone(),
            payments.clone(),
            notifier.clone(),
            config.timeouts,
            cancel.clone(),
        );

        let inner = Inner {
            aggregator: BalanceAggregator::new(wallet.clone(), config.timeouts.balances),
            wallet,
            settings,
            orchestrator,
            ledger,
            payments,
            notifier,
            in_flight: Arc::new(AtomicBool::new(false)),
            shutdown: cancel,
        };

        Ok(Self {
            inner: Arc::new(inner),
            tasks: Mutex::new(JoinSet::new()),
            runtime,
            shutdown,
        })
    }

    /// Hook for "a payment was received", with the mint it landed on if known.
    ///
    /// Returns immediately. Errors of the spawned cycle are logged.
    pub fn on_payment_completed(&self, mint: Option<MintUrl>) {
        if *self.shutdown.borrow() {
            warn!("Auto-withdraw service is shutting down, ignoring trigger");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(finished) = tasks.try_join_next() {
            log_join_result(finished);
        }

        tasks.spawn_on(
            async move {
                match inner.check_and_trigger(mint.as_ref()).await {
                    Ok(outcome) => debug!(?outcome, "Auto-withdrawal check finished"),
                    Err(err) => error!(error = %err, "Auto-withdrawal check failed"),
                }
            },
            &self.runtime,
        );
    }

    /// Runs one check cycle inline and reports how it ended.
    pub async fn check_and_trigger(&self, priority: Option<&MintUrl>) -> Result<CheckOutcome> {
        self.inner.check_and_trigger(priority).await
    }

    /// Waits until every cycle spawned so far has finished.
    pub async fn wait_idle(&self) {
        let mut tasks = {
            let mut guard = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        while let Some(finished) = tasks.join_next().await {
            log_join_result(finished);
        }
    }

    /// Cancels in-flight wallet calls and waits for spawned cycles to record
    /// their outcome. Later triggers, inline or fire-and-forget, are ignored.
    pub async fn shutdown(&self) {
        info!("Shutting down auto-withdraw service");
        self.shutdown.send_replace(true);
        self.wait_idle().await;
    }

    pub fn subscribe(&self) -> Subscription {
        self.inner.notifier.subscribe()
    }

    /// Whether a check cycle holds the in-flight slot.
    ///
    /// The slot is taken before the balance snapshot, so this is also true
    /// while a cycle is still reading balances and may end up selecting no
    /// mint. Triggers arriving meanwhile are dropped.
    pub fn is_withdrawing(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> WithdrawalPhase {
        self.inner.orchestrator.phase()
    }

    pub fn watch_phase(&self) -> watch::Receiver<WithdrawalPhase> {
        self.inner.orchestrator.watch_phase()
    }

    /// Recorded attempts, newest first.
    pub async fn history(&self) -> Result<Vec<WithdrawalAttempt>> {
        self.inner.ledger.list().await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.inner.ledger.clear().await
    }

    pub async fn payment_history(&self) -> Result<Vec<PaymentHistoryEntry>> {
        self.inner.payments.list().await
    }
}

fn log_join_result(result: std::result::Result<(), JoinError>) {
    if let Err(err) = result {
        if err.is_panic() {
            error!(error = %err, "Auto-withdrawal task panicked");
        } else {
            debug!(error = %err, "Auto-withdrawal task cancelled");
        }
    }
}
