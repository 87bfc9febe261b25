use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// RAII claim on the process-wide auto-withdrawal slot.
///
/// Obtained with a compare-and-swap, so two near-simultaneous triggers can
/// never both hold it. The slot is released when the claim is dropped, which
/// covers normal returns, panics and task cancellation alike.
pub struct InFlightClaim {
    in_flight: Arc<AtomicBool>,
}

impl InFlightClaim {
    /// Returns `None` if another withdrawal already holds the slot.
    pub fn try_claim(in_flight: &Arc<AtomicBool>) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;

        Some(Self {
            in_flight: Arc::clone(in_flight),
        })
    }
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
