//! Fixed-interval reconciliation loop for one enrollment.
//!
//! The loop runs as a spawned task owned by a [`Poller`]. Dropping or
//! cancelling the poller aborts the task; results that complete after the
//! view moved on are discarded through the state's epoch.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::state::SharedState;
use crate::api::LesApi;
use crate::lifecycle::EnrollmentStatus;

/// Result of a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Still pollable; schedule another tick.
    Continue,
    /// Record left the pollable set.
    Settled(EnrollmentStatus),
    /// Enrollment fetch failed; polling stops without retry.
    Failed,
    /// Another writer started while this tick was in flight.
    Superseded,
}

pub(crate) struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawns the loop on the current Tokio runtime. The first tick fires
    /// after one `interval`; later ticks start every `interval` regardless of
    /// how long the previous fetch took.
    pub(crate) fn spawn<A: LesApi>(
        api: Arc<A>,
        lmr_id: String,
        state: SharedState,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(run(api, lmr_id, state, interval));
        Self { handle }
    }

    pub(crate) fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<A: LesApi>(api: Arc<A>, lmr_id: String, state: SharedState, interval: Duration) {
    debug!(lmr_id = %lmr_id, interval_ms = interval.as_millis() as u64, "poll loop started");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let outcome = tick(api.as_ref(), &lmr_id, &state).await;
        if outcome != TickOutcome::Continue {
            debug!(lmr_id = %lmr_id, ?outcome, "poll loop finished");
            return;
        }
    }
}

/// Fetches the enrollment and, when relevant, its eligibility, applying both
/// only if no newer writer has started since the tick began.
pub(crate) async fn tick<A: LesApi>(api: &A, lmr_id: &str, state: &SharedState) -> TickOutcome {
    let epoch = state.lock().advance_epoch();

    let enrollment = match api.get_enrollment(lmr_id).await {
        Ok(enrollment) => enrollment,
        Err(err) => {
            warn!(lmr_id, error = %err, "poll tick failed; polling stopped");
            {
                let mut s = state.lock();
                if s.is_current(epoch) {
                    s.polling = false;
                }
            }
            return TickOutcome::Failed;
        }
    };

    let status = enrollment.status;
    {
        let mut s = state.lock();
        if !s.is_current(epoch) {
            return TickOutcome::Superseded;
        }
        s.adopt(enrollment);
        if !status.has_eligibility() && !status.is_pollable() {
            s.polling = false;
        }
    }

    if status.has_eligibility() {
        let eligibility = match api.withdraw_eligibility(lmr_id).await {
            Ok(el) => Some(el),
            Err(err) => {
                debug!(lmr_id, error = %err, "eligibility unavailable");
                None
            }
        };
        let mut s = state.lock();
        if !s.is_current(epoch) {
            return TickOutcome::Superseded;
        }
        s.eligibility = eligibility;
        // Polling is re-evaluated only once every write of the tick has landed.
        if !status.is_pollable() {
            s.polling = false;
        }
    }

    if status.is_pollable() {
        TickOutcome::Continue
    } else {
        TickOutcome::Settled(status)
    }
}
