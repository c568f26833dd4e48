//! Client-side request pacing shared by the provider clients.

use crate::providers::transport;
use atelier_core::AtelierResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Milliseconds since the throttle's epoch; zero means nothing sent yet.
const NEVER_SENT: u64 = 0;

/// Spreads outgoing requests to stay inside a per-minute budget.
///
/// Two mechanisms work together: a semaphore sized to the budget caps how
/// many requests are in flight, and a minimum gap between consecutive sends
/// keeps a burst of classify calls from arriving upstream all at once.
pub(crate) struct Throttle {
    slots: Semaphore,
    last_sent_ms: AtomicU64,
    min_gap: Duration,
    epoch: Instant,
}

impl Throttle {
    /// Build a throttle for a per-minute request budget.
    /// A zero budget is clamped to one; the gap never drops below 10ms.
    pub(crate) fn per_minute(budget: u32) -> Self {
        let budget = budget.max(1);
        let gap_ms = (60_000 / u64::from(budget)).max(10);
        Self {
            slots: Semaphore::new(budget as usize),
            last_sent_ms: AtomicU64::new(NEVER_SENT),
            min_gap: Duration::from_millis(gap_ms),
            epoch: Instant::now(),
        }
    }

    /// Wait until the next request may go out.
    ///
    /// The first send goes immediately; later sends sleep out whatever
    /// remains of the minimum gap. The returned permit must be held until
    /// the request completes so the in-flight cap is honored.
    pub(crate) async fn pace(&self, provider: &'static str) -> AtelierResult<SemaphorePermit<'_>> {
        let slot = self
            .slots
            .acquire()
            .await
            .map_err(|e| transport(provider, format!("throttle closed: {}", e)))?;

        let last = self.last_sent_ms.load(Ordering::Relaxed);
        if last != NEVER_SENT {
            let since = self.now_ms().saturating_sub(last);
            let gap = self.min_gap.as_millis() as u64;
            if since < gap {
                tokio::time::sleep(Duration::from_millis(gap - since)).await;
            }
        }
        // Clamp to 1 so a stored timestamp can never collide with NEVER_SENT.
        self.last_sent_ms.store(self.now_ms().max(1), Ordering::Relaxed);

        Ok(slot)
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
