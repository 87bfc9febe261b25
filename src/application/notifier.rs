use crate::domain::amount::Sats;
use crate::domain::mint::MintUrl;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Lifecycle events of a withdrawal attempt.
///
/// Per attempt, observers see `Started` once, then any number of `Progress`
/// events, then `Completed` or `Failed`. An attempt left pending at the mint
/// ends on a `Progress` event with step `"Pending"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalEvent {
    Started {
        attempt_id: Uuid,
        mint: MintUrl,
        amount: Sats,
        address: String,
    },
    Progress {
        attempt_id: Uuid,
        step: String,
        detail: String,
    },
    Completed {
        attempt_id: Uuid,
        mint: MintUrl,
        amount: Sats,
        fee: Sats,
    },
    Failed {
        attempt_id: Uuid,
        mint: MintUrl,
        error: String,
    },
}

impl WithdrawalEvent {
    pub fn attempt_id(&self) -> Uuid {
        match self {
            Self::Started { attempt_id, .. }
            | Self::Progress { attempt_id, .. }
            | Self::Completed { attempt_id, .. }
            | Self::Failed { attempt_id, .. } => *attempt_id,
        }
    }
}

/// Fans lifecycle events out to any number of subscribers.
///
/// Events are published from the orchestrator's own task; subscribers that
/// need to hop to another thread do so themselves.
#[derive(Clone)]
pub struct ProgressNotifier {
    sender: broadcast::Sender<WithdrawalEvent>,
}

impl ProgressNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn emit(&self, event: WithdrawalEvent) {
        debug!(?event, "Withdrawal event");
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    pub fn progress(&self, attempt_id: Uuid, step: &str, detail: &str) {
        self.emit(WithdrawalEvent::Progress {
            attempt_id,
            step: step.to_string(),
            detail: detail.to_string(),
        });
    }
}

/// An independent stream of [`WithdrawalEvent`]s. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<WithdrawalEvent>,
}

impl Subscription {
    /// Waits for the next event. Returns `None` once the notifier is gone.
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<WithdrawalEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Withdrawal event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns an already-published event without waiting.
    pub fn try_recv(&mut self) -> Option<WithdrawalEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Withdrawal event subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}
