use super::ledger::WithdrawalLedger;
use super::notifier::{ProgressNotifier, WithdrawalEvent};
use super::payment_history::PaymentHistory;
use super::single_flight::InFlightClaim;
use crate::config::WalletTimeouts;
use crate::domain::amount::Sats;
use crate::domain::payment_history::PaymentHistoryEntry;
use crate::domain::policy::WithdrawalCandidate;
use crate::domain::ports::WalletClientRef;
use crate::domain::quote::QuoteState;
use crate::domain::withdrawal::{WithdrawalAttempt, WithdrawalPhase};
use crate::error::{AutoWithdrawError, Result, WalletError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// How a melt that went through ended up at the mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    Paid,
    Pending,
}

/// Drives one withdrawal attempt from quote to persisted record.
///
/// `Preparing → QuoteRequested → Validating → Executing → Polling` and then
/// one of `Completed`, `Pending` or `Failed`. Every attempt, whatever its
/// outcome, is appended to the ledger before [`execute`](Self::execute)
/// returns. Nothing is retried: a quote still settling is reported as
/// `Pending` rather than paid again.
pub struct WithdrawalOrchestrator {
    wallet: WalletClientRef,
    ledger: Arc<WithdrawalLedger>,
    payments: Arc<PaymentHistory>,
    notifier: ProgressNotifier,
    timeouts: WalletTimeouts,
    phase: watch::Sender<WithdrawalPhase>,
    cancel: watch::Receiver<bool>,
}

impl WithdrawalOrchestrator {
    /// `cancel` flips to `true` when the owning service shuts down. An attempt
    /// waiting on the wallet at that point is abandoned: recorded as failed if
    /// the melt was not sent yet, left pending as unconfirmed otherwise.
    pub fn new(
        wallet: WalletClientRef,
        ledger: Arc<WithdrawalLedger>,
        payments: Arc<PaymentHistory>,
        notifier: ProgressNotifier,
        timeouts: WalletTimeouts,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        let (phase, _) = watch::channel(WithdrawalPhase::Idle);
        Self {
            wallet,
            ledger,
            payments,
            notifier,
            timeouts,
            phase,
            cancel,
        }
    }

    /// Current phase, or the terminal phase of the last attempt.
    pub fn phase(&self) -> WithdrawalPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<WithdrawalPhase> {
        self.phase.subscribe()
    }

    /// Runs one attempt for `candidate`. Holding the claim is what makes this
    /// the only attempt in flight.
    pub async fn execute(
        &self,
        _claim: &InFlightClaim,
        candidate: WithdrawalCandidate,
    ) -> WithdrawalAttempt {
        self.set_phase(WithdrawalPhase::Preparing);

        let amount = candidate.amount();
        let mut attempt = WithdrawalAttempt::new(
            candidate.mint.clone(),
            candidate.settings.address.clone(),
            amount,
        );

        info!(
            attempt_id = %attempt.id,
            mint = %attempt.mint,
            balance = %candidate.balance,
            amount = %amount,
            percentage = candidate.settings.percentage,
            threshold = %candidate.settings.threshold,
            address = %attempt.address,
            "Starting auto-withdrawal"
        );

        self.notifier.emit(WithdrawalEvent::Started {
            attempt_id: attempt.id,
            mint: attempt.mint.clone(),
            amount,
            address: attempt.address.clone(),
        });
        self.notifier
            .progress(attempt.id, "Preparing", "Getting quote...");

        let mut mirrored = false;
        let outcome = self
            .drive(&mut attempt, candidate.balance, &mut mirrored)
            .await;

        match outcome {
            Ok(Settlement::Paid) => {
                attempt.complete();
                self.set_phase(WithdrawalPhase::Completed);
                info!(
                    attempt_id = %attempt.id,
                    amount = %attempt.amount,
                    fee = %attempt.fee,
                    "Auto-withdrawal completed"
                );
                self.notifier.emit(WithdrawalEvent::Completed {
                    attempt_id: attempt.id,
                    mint: attempt.mint.clone(),
                    amount: attempt.amount,
                    fee: attempt.fee,
                });
            }
            Ok(Settlement::Pending) => {
                attempt.leave_pending();
                self.set_phase(WithdrawalPhase::Pending);
                info!(attempt_id = %attempt.id, "Auto-withdrawal pending at the mint");
                self.notifier
                    .progress(attempt.id, "Pending", "Payment is pending...");
            }
            Err(AutoWithdrawError::Unconfirmed) => {
                let message = AutoWithdrawError::Unconfirmed.to_string();
                warn!(attempt_id = %attempt.id, quote_id = ?attempt.quote_id, "{message}");
                attempt.leave_unconfirmed(message);
                self.set_phase(WithdrawalPhase::Pending);
                self.notifier
                    .progress(attempt.id, "Pending", "Payment outcome unconfirmed");
            }
            Err(err) => {
                error!(
                    attempt_id = %attempt.id,
                    mint = %attempt.mint,
                    amount = %attempt.amount,
                    error = %err,
                    "Auto-withdrawal failed"
                );
                let message = err.to_string();
                attempt.fail(message.clone());
                self.set_phase(WithdrawalPhase::Failed);
                self.notifier.emit(WithdrawalEvent::Failed {
                    attempt_id: attempt.id,
                    mint: attempt.mint.clone(),
                    error: message,
                });
            }
        }

        self.finalize(&attempt, mirrored).await;
        attempt
    }

    async fn drive(
        &self,
        attempt: &mut WithdrawalAttempt,
        snapshot_balance: Sats,
        mirrored: &mut bool,
    ) -> Result<Settlement> {
        self.set_phase(WithdrawalPhase::QuoteRequested);
        self.notifier
            .progress(attempt.id, "Quote", "Getting Lightning quote...");

        let amount_msat = attempt.amount.to_msat()?;
        let quote = self
            .call(
                self.timeouts.quote,
                self.wallet
                    .request_melt_quote(&attempt.mint, &attempt.address, amount_msat),
            )
            .await?
            .map_err(AutoWithdrawError::QuoteRequestFailed)?;

        debug!(
            quote_id = %quote.id,
            amount = %quote.amount,
            fee_reserve = %quote.fee_reserve,
            request = %quote.request,
            "Melt quote received"
        );

        self.set_phase(WithdrawalPhase::Validating);
        let required = quote.total_required()?;
        if required > snapshot_balance {
            return Err(AutoWithdrawError::InsufficientBalance {
                required,
                available: snapshot_balance,
            });
        }
        attempt.record_quote(quote.id.clone(), quote.fee_reserve);

        // Visible before any funds move, so a crash mid-melt still leaves a
        // pending record behind.
        self.payments
            .add(PaymentHistoryEntry::withdrawal(attempt, &quote))
            .await?;
        *mirrored = true;

        self.set_phase(WithdrawalPhase::Executing);
        self.notifier
            .progress(attempt.id, "Sending", "Sending payment...");
        let melted = self
            .call(self.timeouts.melt, self.wallet.melt(&attempt.mint, &quote.id))
            .await
            .map_err(unconfirmed_after_send)?;

        self.set_phase(WithdrawalPhase::Polling);
        let outcome = match melted {
            Ok(outcome) => outcome,
            Err(melt_error) => return self.reconcile_failed_melt(attempt, melt_error).await,
        };
        if let Some(fee_paid) = outcome.fee_paid {
            debug!(reserve = %attempt.fee, fee_paid = %fee_paid, "Mint reported the fee charged");
            attempt.fee = fee_paid;
        }

        let settled = self
            .call(
                self.timeouts.status,
                self.wallet.check_melt_quote(&attempt.mint, &quote.id),
            )
            .await
            .map_err(unconfirmed_after_send)?
            .map_err(AutoWithdrawError::QuoteStatusFailed)?;
        debug!(quote_id = %quote.id, state = %settled.state, "Final quote state");

        settle(settled.state)
    }

    /// A failed melt submission does not prove the funds stayed put. Ask the
    /// mint once before calling it a failure.
    async fn reconcile_failed_melt(
        &self,
        attempt: &WithdrawalAttempt,
        melt_error: WalletError,
    ) -> Result<Settlement> {
        let Some(quote_id) = attempt.quote_id.as_deref() else {
            return Err(AutoWithdrawError::MeltExecutionFailed(melt_error));
        };
        warn!(
            attempt_id = %attempt.id,
            quote_id,
            error = %melt_error,
            "Melt submission failed, checking quote state"
        );

        let requery = self
            .call(
                self.timeouts.status,
                self.wallet.check_melt_quote(&attempt.mint, quote_id),
            )
            .await
            .map_err(unconfirmed_after_send)?;

        match requery {
            Ok(quote) => match quote.state {
                QuoteState::Paid => {
                    warn!(quote_id, "Melt reported an error but the quote is paid");
                    Ok(Settlement::Paid)
                }
                QuoteState::Pending => Ok(Settlement::Pending),
                _ => Err(AutoWithdrawError::MeltExecutionFailed(melt_error)),
            },
            Err(status_error) => {
                warn!(quote_id, error = %status_error, "Could not confirm quote state after failed melt");
                Err(AutoWithdrawError::MeltExecutionFailed(melt_error))
            }
        }
    }

    async fn finalize(&self, attempt: &WithdrawalAttempt, mirrored: bool) {
        if let Err(err) = self.ledger.append(attempt.clone()).await {
            error!(attempt_id = %attempt.id, error = %err, "Failed to record withdrawal history");
        }
        if mirrored
            && let Err(err) = self
                .payments
                .update_status(attempt.id, attempt.status.into())
                .await
        {
            error!(attempt_id = %attempt.id, error = %err, "Failed to update payment history");
        }
        debug!(attempt_id = %attempt.id, status = %attempt.status, "Withdrawal recorded");
    }

    /// Bounds a wallet round trip by `limit` and aborts it on shutdown.
    ///
    /// The outer error is cancellation; the inner one is whatever the wallet
    /// (or the timeout) reported.
    async fn call<T, F>(
        &self,
        limit: Duration,
        request: F,
    ) -> Result<std::result::Result<T, WalletError>>
    where
        F: Future<Output = std::result::Result<T, WalletError>>,
    {
        let mut cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => Err(AutoWithdrawError::Cancelled),
            outcome = tokio::time::timeout(limit, request) => {
                Ok(outcome.unwrap_or_else(|_| Err(WalletError::Timeout(limit))))
            }
        }
    }

    fn set_phase(&self, phase: WithdrawalPhase) {
        self.phase.send_replace(phase);
    }
}

/// Once the melt is sent, giving up no longer means the funds stayed put.
fn unconfirmed_after_send(err: AutoWithdrawError) -> AutoWithdrawError {
    match err {
        AutoWithdrawError::Cancelled => AutoWithdrawError::Unconfirmed,
        other => other,
    }
}

fn settle(state: QuoteState) -> Result<Settlement> {
    match state {
        QuoteState::Paid => Ok(Settlement::Paid),
        QuoteState::Pending => Ok(Settlement::Pending),
        QuoteState::Unpaid => Err(AutoWithdrawError::QuoteUnpaid),
        QuoteState::Unknown(other) => Err(AutoWithdrawError::UnknownQuoteState(other)),
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        // Nobody can cancel any more.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notifier::Subscription;
    use crate::domain::mint::MintUrl;
    use crate::domain::payment_history::PaymentStatus;
    use crate::domain::settings::MintWithdrawSettings;
    use crate::domain::withdrawal::{PENDING_MESSAGE, WithdrawalStatus};
    use crate::infrastructure::in_memory::InMemoryKeyValueStore;
    use crate::infrastructure::simulated_wallet::{MeltFailure, SimulatedWallet, WalletCalls};
    use std::sync::atomic::AtomicBool;

    struct Harness {
        wallet: SimulatedWallet,
        orchestrator: WithdrawalOrchestrator,
        ledger: Arc<WithdrawalLedger>,
        payments: Arc<PaymentHistory>,
        notifier: ProgressNotifier,
        cancel: watch::Sender<bool>,
        slot: Arc<AtomicBool>,
    }

    fn mint() -> MintUrl {
        MintUrl::new("https://a.example").unwrap()
    }

    fn harness(wallet: SimulatedWallet) -> Harness {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let ledger = Arc::new(WithdrawalLedger::new(store.clone()));
        let payments = Arc::new(PaymentHistory::new(store));
        let notifier = ProgressNotifier::new(32);
        let (cancel, cancel_rx) = watch::channel(false);
        let orchestrator = WithdrawalOrchestrator::new(
            Arc::new(wallet.clone()),
            ledger.clone(),
            payments.clone(),
            notifier.clone(),
            WalletTimeouts::uniform(Duration::from_secs(5)),
            cancel_rx,
        );
        Harness {
            wallet,
            orchestrator,
            ledger,
            payments,
            notifier,
            cancel,
            slot: Arc::new(AtomicBool::new(false)),
        }
    }

    fn candidate(balance: u64) -> WithdrawalCandidate {
        WithdrawalCandidate {
            mint: mint(),
            balance: Sats(balance),
            settings: MintWithdrawSettings {
                mint: mint(),
                enabled: true,
                threshold: Sats(1_000),
                percentage: 95,
                address: "pos@ln.example".to_string(),
            },
        }
    }

    impl Harness {
        async fn run(&self, balance: u64) -> WithdrawalAttempt {
            let claim = InFlightClaim::try_claim(&self.slot).unwrap();
            self.orchestrator.execute(&claim, candidate(balance)).await
        }
    }

    fn drain(subscription: &mut Subscription) -> Vec<WithdrawalEvent> {
        std::iter::from_fn(|| subscription.try_recv()).collect()
    }

    #[tokio::test]
    async fn test_paid_quote_completes_with_fee_reserve() {
        let h = harness(SimulatedWallet::new().with_fee_reserve(Sats(50)));
        h.wallet.credit(&mint(), Sats(10_000)).await;
        let mut events = h.notifier.subscribe();

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Completed);
        assert_eq!(attempt.amount, Sats(9_500));
        assert_eq!(attempt.fee, Sats(50));
        assert!(attempt.error_message.is_none());
        assert_eq!(h.orchestrator.phase(), WithdrawalPhase::Completed);
        assert_eq!(h.ledger.list().await.unwrap(), vec![attempt.clone()]);

        let mirrored = h.payments.get(attempt.id).await.unwrap().unwrap();
        assert_eq!(mirrored.status, PaymentStatus::Completed);
        assert_eq!(mirrored.amount, -9_500);

        let events = drain(&mut events);
        assert!(matches!(events.first(), Some(WithdrawalEvent::Started { amount, .. }) if *amount == Sats(9_500)));
        assert!(matches!(
            events.last(),
            Some(WithdrawalEvent::Completed { fee, .. }) if *fee == Sats(50)
        ));
        let steps: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                WithdrawalEvent::Progress { step, .. } => Some(step.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec!["Preparing", "Quote", "Sending"]);
    }

    #[tokio::test]
    async fn test_pending_quote_is_soft_terminal() {
        let h = harness(SimulatedWallet::new().with_settle_state(QuoteState::Pending));
        h.wallet.credit(&mint(), Sats(10_000)).await;
        let mut events = h.notifier.subscribe();

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Pending);
        assert_eq!(attempt.error_message.as_deref(), Some(PENDING_MESSAGE));
        assert_eq!(h.orchestrator.phase(), WithdrawalPhase::Pending);
        assert_eq!(h.wallet.calls().status_checks, 1);

        let events = drain(&mut events);
        assert!(matches!(
            events.last(),
            Some(WithdrawalEvent::Progress { step, .. }) if step == "Pending"
        ));
        assert!(!events.iter().any(|event| matches!(
            event,
            WithdrawalEvent::Completed { .. } | WithdrawalEvent::Failed { .. }
        )));
        let mirrored = h.payments.get(attempt.id).await.unwrap().unwrap();
        assert_eq!(mirrored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_unpaid_quote_fails() {
        let h = harness(SimulatedWallet::new().with_settle_state(QuoteState::Unpaid));
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert_eq!(
            attempt.error_message.as_deref(),
            Some("Payment failed: Quote state is UNPAID")
        );
        let mirrored = h.payments.get(attempt.id).await.unwrap().unwrap();
        assert_eq!(mirrored.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_quote_state_fails() {
        let h = harness(
            SimulatedWallet::new().with_settle_state(QuoteState::Unknown("EXPIRED".to_string())),
        );
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let attempt = h.run(10_000).await;
        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert_eq!(
            attempt.error_message.as_deref(),
            Some("Payment failed: Unknown quote state EXPIRED")
        );
    }

    #[tokio::test]
    async fn test_insufficient_balance_never_melts() {
        let h = harness(
            SimulatedWallet::new()
                .with_quote_amount(Sats(9_500))
                .with_fee_reserve(Sats(50)),
        );
        h.wallet.credit(&mint(), Sats(9_000)).await;
        let mut events = h.notifier.subscribe();

        let attempt = h.run(9_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert!(
            attempt
                .error_message
                .as_deref()
                .unwrap()
                .contains("need 9550 sats, have 9000 sats")
        );
        assert_eq!(h.wallet.calls().melts, 0);
        assert_eq!(h.wallet.balance(&mint()).await, Sats(9_000));
        assert!(h.payments.list().await.unwrap().is_empty());
        assert_eq!(h.ledger.list().await.unwrap().len(), 1);
        assert!(matches!(
            drain(&mut events).last(),
            Some(WithdrawalEvent::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_quote_failure_records_failed_attempt() {
        let h = harness(
            SimulatedWallet::new().with_quote_failure(WalletError::Network("refused".to_string())),
        );

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert!(attempt.quote_id.is_none());
        assert!(
            attempt
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("Quote request failed")
        );
        assert_eq!(
            h.wallet.calls(),
            WalletCalls {
                balances: 0,
                quotes: 1,
                melts: 0,
                status_checks: 0
            }
        );
    }

    #[tokio::test]
    async fn test_rejected_melt_fails_after_requery() {
        let h = harness(SimulatedWallet::new().with_melt_failure(MeltFailure::Rejected(
            WalletError::Protocol("invoice expired".to_string()),
        )));
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert!(
            attempt
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("Melt execution failed")
        );
        assert_eq!(h.wallet.calls().status_checks, 1);
        assert_eq!(h.wallet.balance(&mint()).await, Sats(10_000));
    }

    #[tokio::test]
    async fn test_lost_melt_response_is_reconciled_as_paid() {
        let h = harness(SimulatedWallet::new().with_melt_failure(MeltFailure::LostResponse(
            WalletError::Network("connection reset".to_string()),
        )));
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Completed);
        assert_eq!(h.wallet.balance(&mint()).await, Sats(500));
    }

    #[tokio::test]
    async fn test_status_failure_marks_attempt_failed() {
        let h = harness(
            SimulatedWallet::new().with_status_failure(WalletError::Network("timeout".to_string())),
        );
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let attempt = h.run(10_000).await;
        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert!(
            attempt
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("Quote status check failed")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_mint_times_out() {
        let h = harness(SimulatedWallet::new().with_latency(Duration::from_secs(600)));

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert!(attempt.error_message.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_still_records_attempt() {
        let h = harness(SimulatedWallet::new().with_latency(Duration::from_secs(3)));
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let (attempt, _) = tokio::join!(h.run(10_000), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            h.cancel.send_replace(true);
        });

        assert_eq!(attempt.status, WithdrawalStatus::Failed);
        assert_eq!(
            attempt.error_message.as_deref(),
            Some("Withdrawal cancelled before completion")
        );
        assert_eq!(h.ledger.list().await.unwrap(), vec![attempt]);
    }

    #[tokio::test]
    async fn test_fee_charged_by_mint_replaces_reserve() {
        let h = harness(
            SimulatedWallet::new()
                .with_fee_reserve(Sats(50))
                .with_fee_charged(Sats(12)),
        );
        h.wallet.credit(&mint(), Sats(10_000)).await;
        let mut events = h.notifier.subscribe();

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Completed);
        assert_eq!(attempt.fee, Sats(12));
        assert_eq!(h.wallet.balance(&mint()).await, Sats(488));
        assert!(matches!(
            drain(&mut events).last(),
            Some(WithdrawalEvent::Completed { fee, .. }) if *fee == Sats(12)
        ));
    }

    #[tokio::test]
    async fn test_lost_melt_response_on_pending_quote_stays_pending() {
        let h = harness(
            SimulatedWallet::new()
                .with_settle_state(QuoteState::Pending)
                .with_melt_failure(MeltFailure::LostResponse(WalletError::Network(
                    "connection reset".to_string(),
                ))),
        );
        h.wallet.credit(&mint(), Sats(10_000)).await;

        let attempt = h.run(10_000).await;

        assert_eq!(attempt.status, WithdrawalStatus::Pending);
        assert_eq!(attempt.error_message.as_deref(), Some(PENDING_MESSAGE));
        assert_eq!(h.orchestrator.phase(), WithdrawalPhase::Pending);
        let calls = h.wallet.calls();
        assert_eq!(calls.melts, 1);
        assert_eq!(calls.status_checks, 1);
        let mirrored = h.payments.get(attempt.id).await.unwrap().unwrap();
        assert_eq!(mirrored.status, PaymentStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_after_melt_sent_is_unconfirmed() {
        let h = harness(SimulatedWallet::new().with_latency(Duration::from_secs(3)));
        h.wallet.credit(&mint(), Sats(10_000)).await;
        let mut events = h.notifier.subscribe();

        // Quote answers at 3s; the melt is in flight when shutdown lands at 4s.
        let (attempt, _) = tokio::join!(h.run(10_000), async {
            tokio::time::sleep(Duration::from_secs(4)).await;
            h.cancel.send_replace(true);
        });

        assert_eq!(attempt.status, WithdrawalStatus::Pending);
        assert_eq!(
            attempt.error_message.as_deref(),
            Some("Withdrawal interrupted after the payment was sent; outcome unconfirmed")
        );
        assert!(attempt.quote_id.is_some());
        assert_eq!(h.orchestrator.phase(), WithdrawalPhase::Pending);
        assert_eq!(h.wallet.calls().melts, 1);
        assert_eq!(h.ledger.list().await.unwrap(), vec![attempt.clone()]);

        let mirrored = h.payments.get(attempt.id).await.unwrap().unwrap();
        assert_eq!(mirrored.status, PaymentStatus::Pending);
        assert!(!drain(&mut events).iter().any(|event| matches!(
            event,
            WithdrawalEvent::Failed { .. } | WithdrawalEvent::Completed { .. }
        )));
    }
}
