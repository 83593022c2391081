use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::ViewError;
use super::poller::Poller;
use super::state::{BusyGuard, DetailState, Notice, SharedState};
use crate::api::{Enrollment, LesApi};
use crate::lifecycle::{Action, EnrollmentStatus};

const LOAD_FAILED: &str = "Failed to load enrollment";
const ACTION_FAILED: &str = "Action failed";

/// Controller for the detail screen of one enrollment.
///
/// Owns the view state, runs at most one poll loop, and executes the
/// status-changing actions. Must be used from within a Tokio runtime.
/// Dropping the view cancels its poll loop.
pub struct EnrollmentView<A: LesApi> {
    api: Arc<A>,
    lmr_id: String,
    state: SharedState,
    poll_interval: Duration,
    poller: Option<Poller>,
    torn_down: bool,
}

impl<A: LesApi> EnrollmentView<A> {
    pub fn new(api: Arc<A>, lmr_id: impl Into<String>, poll_interval: Duration) -> Self {
        let state = SharedState::default();
        state.lock().loading = true;
        Self {
            api,
            lmr_id: lmr_id.into(),
            state,
            poll_interval,
            poller: None,
            torn_down: false,
        }
    }

    pub fn lmr_id(&self) -> &str {
        &self.lmr_id
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> DetailState {
        self.state.snapshot()
    }

    pub fn is_polling(&self) -> bool {
        self.state.lock().polling
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().notices()
    }

    /// Fetches the enrollment and, when relevant, its eligibility, then starts
    /// or stops polling to match the status.
    ///
    /// Failures are recorded in the state's `error` and stop polling.
    pub async fn load(&mut self) -> Result<EnrollmentStatus, ViewError> {
        self.ensure_active()?;
        self.stop_polling();
        let epoch = {
            let mut s = self.state.lock();
            s.loading = true;
            s.advance_epoch()
        };

        match self.api.get_enrollment(&self.lmr_id).await {
            Ok(enrollment) => {
                let status = enrollment.status;
                {
                    let mut s = self.state.lock();
                    if !s.is_current(epoch) {
                        return Err(ViewError::TornDown);
                    }
                    s.adopt(enrollment);
                    s.loading = false;
                }
                if status.has_eligibility() {
                    self.refresh_eligibility(epoch).await;
                }
                self.reconcile_polling(status);
                Ok(status)
            }
            Err(err) => {
                let message = err.user_message(LOAD_FAILED);
                warn!(lmr_id = %self.lmr_id, error = %err, "failed to load enrollment");
                let mut s = self.state.lock();
                if s.is_current(epoch) {
                    s.error = Some(message.clone());
                    s.loading = false;
                }
                Err(ViewError::Load(message))
            }
        }
    }

    /// Runs `action` against the server and adopts the returned record.
    ///
    /// The action must currently be offered (see [`DetailState::available_action`]).
    /// On failure the server message (or a generic one) is recorded and the
    /// enrollment is reloaded to resynchronise.
    pub async fn perform(&mut self, action: Action) -> Result<Enrollment, ViewError> {
        self.ensure_active()?;
        {
            let s = self.state.lock();
            if s.available_action() != Some(action) {
                return Err(ViewError::NotOffered {
                    action,
                    status: s.status(),
                });
            }
        }

        self.stop_polling();
        let busy = BusyGuard::engage(&self.state);
        let epoch = {
            let mut s = self.state.lock();
            s.error = None;
            s.success = None;
            s.advance_epoch()
        };
        debug!(lmr_id = %self.lmr_id, %action, "performing action");

        let result = match action {
            Action::Submit => self.api.submit(&self.lmr_id).await,
            Action::Approve => self.api.approve(&self.lmr_id).await,
            Action::Withdraw => self.api.withdraw(&self.lmr_id).await,
        };
        match result {
            Ok(enrollment) => {
                let status = enrollment.status;
                if status != action.target() {
                    warn!(lmr_id = %self.lmr_id, %action, expected = %action.target(), %status, "server answered with an unexpected status");
                }
                {
                    let mut s = self.state.lock();
                    if !s.is_current(epoch) {
                        return Err(ViewError::TornDown);
                    }
                    s.adopt(enrollment.clone());
                    s.success = Some(format!("{}: status is now {status}.", action.label()));
                }
                if status.has_eligibility() {
                    self.refresh_eligibility(epoch).await;
                }
                self.reconcile_polling(status);
                drop(busy);
                Ok(enrollment)
            }
            Err(err) => {
                let message = err.user_message(ACTION_FAILED);
                warn!(lmr_id = %self.lmr_id, %action, status = ?err.status(), error = %err, "action failed");
                self.state.lock().error = Some(message.clone());
                drop(busy);
                if let Err(reload) = self.load().await {
                    debug!(lmr_id = %self.lmr_id, error = %reload, "reload after failed action also failed");
                }
                Err(ViewError::Action { action, message })
            }
        }
    }

    pub async fn submit(&mut self) -> Result<Enrollment, ViewError> {
        self.perform(Action::Submit).await
    }

    pub async fn approve(&mut self) -> Result<Enrollment, ViewError> {
        self.perform(Action::Approve).await
    }

    pub async fn withdraw(&mut self) -> Result<Enrollment, ViewError> {
        self.perform(Action::Withdraw).await
    }

    /// Replaces any running poll loop with a new one.
    pub fn start_polling(&mut self) {
        if self.torn_down {
            return;
        }
        self.stop_polling();
        self.state.lock().polling = true;
        self.poller = Some(Poller::spawn(
            self.api.clone(),
            self.lmr_id.clone(),
            self.state.clone(),
            self.poll_interval,
        ));
    }

    /// Cancels the poll loop; results of an in-flight tick are discarded.
    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        let mut s = self.state.lock();
        s.polling = false;
        s.advance_epoch();
    }

    /// Deactivates the view. No state changes happen afterwards.
    pub fn teardown(&mut self) {
        self.stop_polling();
        self.torn_down = true;
    }

    fn reconcile_polling(&mut self, status: EnrollmentStatus) {
        if status.is_pollable() {
            self.start_polling();
        } else {
            self.stop_polling();
        }
    }

    async fn refresh_eligibility(&self, epoch: u64) {
        let eligibility = match self.api.withdraw_eligibility(&self.lmr_id).await {
            Ok(el) => Some(el),
            Err(err) => {
                debug!(lmr_id = %self.lmr_id, error = %err, "eligibility unavailable");
                None
            }
        };
        let mut s = self.state.lock();
        if s.is_current(epoch) {
            s.eligibility = eligibility;
        }
    }

    fn ensure_active(&self) -> Result<(), ViewError> {
        if self.torn_down {
            Err(ViewError::TornDown)
        } else {
            Ok(())
        }
    }
}

impl<A: LesApi> Drop for EnrollmentView<A> {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        self.state.lock().advance_epoch();
    }
}
