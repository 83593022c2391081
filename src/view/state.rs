//! Per-view state of the enrollment detail screen.
//!
//! [`DetailState`] is owned by one [`EnrollmentView`](super::EnrollmentView)
//! and shared with its poll task through [`SharedState`]. Writers:
//! the initial load, poll ticks and action completions. Every writer tags its
//! work with an epoch and drops results once a newer writer has begun.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::api::{Enrollment, WithdrawEligibility};
use crate::lifecycle::{Action, EnrollmentStatus, StatusMachine, Transition};

const UNKNOWN_ELIGIBILITY: &str = "Eligibility not yet available from MECT.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
    Success,
    Pending,
}

/// A message the view wants shown next to the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    /// Last record adopted from the server.
    pub enrollment: Option<Enrollment>,
    /// Last eligibility answer; `None` when unknown or not applicable.
    pub eligibility: Option<WithdrawEligibility>,
    pub loading: bool,
    /// An action call is in flight.
    pub busy: bool,
    /// A poll loop is active.
    pub polling: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    epoch: u64,
}

impl DetailState {
    pub fn status(&self) -> Option<EnrollmentStatus> {
        self.enrollment.as_ref().map(|e| e.status)
    }

    /// Starts a new writer generation; results tagged with older epochs are stale.
    pub(crate) fn advance_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Replaces the held record with the server's.
    pub(crate) fn adopt(&mut self, enrollment: Enrollment) {
        match StatusMachine::observe(self.status(), enrollment.status) {
            Transition::Initial(status) => {
                debug!(lmr_id = %enrollment.lmr_id, %status, "enrollment loaded");
            }
            Transition::Unchanged(_) => {}
            Transition::Advanced { from, to } => {
                info!(lmr_id = %enrollment.lmr_id, %from, %to, "enrollment status changed");
            }
            Transition::Unexpected { from, to } => {
                warn!(lmr_id = %enrollment.lmr_id, %from, %to, "server reported an unexpected status change");
            }
        }
        if !enrollment.rejection_is_consistent() {
            warn!(
                lmr_id = %enrollment.lmr_id,
                status = %enrollment.status,
                "withdrawal rejection annotation does not match status"
            );
        }
        if !enrollment.status.has_eligibility() {
            self.eligibility = None;
        }
        self.enrollment = Some(enrollment);
    }

    /// The action the view offers, if any. Never offered while busy.
    pub fn available_action(&self) -> Option<Action> {
        if self.busy {
            return None;
        }
        let status = self.status()?;
        Action::offered(status, self.eligibility.as_ref().map(|e| e.can_withdraw))
    }

    /// Eligibility line for the detail panel; `None` when the status has no
    /// eligibility to show.
    pub fn eligibility_summary(&self) -> Option<String> {
        if !self.status()?.has_eligibility() {
            return None;
        }
        Some(match &self.eligibility {
            Some(el) if el.can_withdraw => "Withdrawal allowed".to_string(),
            Some(el) if !el.message.is_empty() => format!("Withdrawal not allowed: {}", el.message),
            Some(_) => "Withdrawal not allowed".to_string(),
            None => UNKNOWN_ELIGIBILITY.to_string(),
        })
    }

    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(error) = &self.error {
            notices.push(Notice::new(NoticeKind::Error, error));
        }
        if let Some(success) = &self.success {
            notices.push(Notice::new(NoticeKind::Success, success));
        }

        let Some(enrollment) = &self.enrollment else {
            return notices;
        };

        if let Some(el) = &self.eligibility
            && !el.can_withdraw
            && !el.message.is_empty()
        {
            notices.push(Notice::new(NoticeKind::Info, &el.message));
        }

        match enrollment.status {
            EnrollmentStatus::Approved if self.polling => {
                notices.push(Notice::new(NoticeKind::Pending, "Checking eligibility periodically."));
            }
            EnrollmentStatus::WithdrawnRequested => {
                notices.push(Notice::new(
                    NoticeKind::Pending,
                    "Withdrawal requested. Waiting for MECT to respond…",
                ));
                if self.polling {
                    notices.push(Notice::new(NoticeKind::Pending, "Checking status automatically."));
                }
            }
            EnrollmentStatus::Withdrawn => {
                notices.push(Notice::new(
                    NoticeKind::Success,
                    "Withdrawal completed. This LMR has been withdrawn by MECT.",
                ));
            }
            EnrollmentStatus::WithdrawRejected => {
                let reason = enrollment
                    .withdraw_reject_reason
                    .as_deref()
                    .filter(|r| !r.is_empty())
                    .unwrap_or("See message above.");
                notices.push(Notice::new(
                    NoticeKind::Error,
                    format!("Withdrawal rejected by MECT: {reason}"),
                ));
            }
            _ => {}
        }
        notices
    }
}

/// Handle to a [`DetailState`] shared between a view and its poll task.
///
/// The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Arc<Mutex<DetailState>>);

impl SharedState {
    pub(crate) fn lock(&self) -> MutexGuard<'_, DetailState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> DetailState {
        self.lock().clone()
    }
}

/// Holds the busy flag for the lifetime of one action, including when the
/// action's future is dropped mid-flight.
pub(crate) struct BusyGuard(SharedState);

impl BusyGuard {
    pub(crate) fn engage(state: &SharedState) -> Self {
        state.lock().busy = true;
        Self(state.clone())
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.lock().busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::fake::{eligibility, enrollment};

    fn state_with(status: EnrollmentStatus) -> DetailState {
        let mut state = DetailState::default();
        state.adopt(enrollment("X1", status));
        state
    }

    #[test]
    fn epochs_invalidate_older_writers() {
        let mut state = DetailState::default();
        let first = state.advance_epoch();
        assert!(state.is_current(first));
        let second = state.advance_epoch();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }

    #[test]
    fn adopting_non_eligibility_status_clears_eligibility() {
        let mut state = state_with(EnrollmentStatus::Approved);
        state.eligibility = Some(eligibility("X1", true, ""));
        state.adopt(enrollment("X1", EnrollmentStatus::WithdrawnRequested));
        assert!(state.eligibility.is_some());

        let mut state = state_with(EnrollmentStatus::Submitted);
        state.eligibility = Some(eligibility("X1", true, ""));
        state.adopt(enrollment("X1", EnrollmentStatus::Draft));
        assert!(state.eligibility.is_none());
    }

    #[test]
    fn ineligible_approved_enrollment_offers_no_withdraw_and_shows_reason() {
        let mut state = state_with(EnrollmentStatus::Approved);
        state.eligibility = Some(eligibility("X1", false, "window closed"));

        assert_eq!(state.available_action(), None);
        assert!(state.notices().contains(&Notice::new(NoticeKind::Info, "window closed")));
    }

    #[test]
    fn eligibility_summary_defaults_when_unknown() {
        let mut state = state_with(EnrollmentStatus::Approved);
        assert_eq!(
            state.eligibility_summary().as_deref(),
            Some("Eligibility not yet available from MECT.")
        );
        state.eligibility = Some(eligibility("X1", false, "window closed"));
        assert_eq!(
            state.eligibility_summary().as_deref(),
            Some("Withdrawal not allowed: window closed")
        );
        assert_eq!(state_with(EnrollmentStatus::Draft).eligibility_summary(), None);
    }

    #[test]
    fn eligible_approved_enrollment_offers_withdraw() {
        let mut state = state_with(EnrollmentStatus::Approved);
        state.eligibility = Some(eligibility("X1", true, ""));
        assert_eq!(state.available_action(), Some(Action::Withdraw));

        state.busy = true;
        assert_eq!(state.available_action(), None);
    }

    #[test]
    fn withdrawn_requested_notices_follow_polling_flag() {
        let mut state = state_with(EnrollmentStatus::WithdrawnRequested);
        let texts = |s: &DetailState| s.notices().into_iter().map(|n| n.text).collect::<Vec<_>>();

        assert_eq!(texts(&state), vec!["Withdrawal requested. Waiting for MECT to respond…"]);
        state.polling = true;
        assert_eq!(
            texts(&state),
            vec![
                "Withdrawal requested. Waiting for MECT to respond…",
                "Checking status automatically."
            ]
        );
    }

    #[test]
    fn rejected_notice_uses_reason_or_fallback() {
        let mut rejected = enrollment("X1", EnrollmentStatus::WithdrawRejected);
        rejected.withdraw_reject_reason = Some("state changed in MECT".into());
        let mut state = DetailState::default();
        state.adopt(rejected);
        assert_eq!(
            state.notices(),
            vec![Notice::new(
                NoticeKind::Error,
                "Withdrawal rejected by MECT: state changed in MECT"
            )]
        );

        let state = state_with(EnrollmentStatus::WithdrawRejected);
        assert_eq!(
            state.notices()[0].text,
            "Withdrawal rejected by MECT: See message above."
        );
    }

    #[test]
    fn busy_guard_clears_flag_on_drop() {
        let shared = SharedState::default();
        {
            let _busy = BusyGuard::engage(&shared);
            assert!(shared.lock().busy);
        }
        assert!(!shared.lock().busy);
    }
}
