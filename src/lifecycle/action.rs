use std::fmt;

use super::status::EnrollmentStatus;

/// A user-triggered, status-changing operation.
///
/// Each action is only offered from one status; the server decides the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Submit,
    Approve,
    Withdraw,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl Action {
    /// Last path segment of `POST /lmrs/{lmrId}/<segment>`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Action::Submit => "submit",
            Action::Approve => "approve",
            Action::Withdraw => "withdraw",
        }
    }

    /// Status the action is offered from.
    pub fn source(self) -> EnrollmentStatus {
        match self {
            Action::Submit => EnrollmentStatus::Draft,
            Action::Approve => EnrollmentStatus::Submitted,
            Action::Withdraw => EnrollmentStatus::Approved,
        }
    }

    /// Status the server is expected to answer with.
    pub fn target(self) -> EnrollmentStatus {
        match self {
            Action::Submit => EnrollmentStatus::Submitted,
            Action::Approve => EnrollmentStatus::Approved,
            Action::Withdraw => EnrollmentStatus::WithdrawnRequested,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Submit => "Submit for approval",
            Action::Approve => "Approve enrollment",
            Action::Withdraw => "Withdraw",
        }
    }

    /// The action offered for `status`, if any.
    ///
    /// `can_withdraw` is the most recent eligibility answer; withdraw is only
    /// offered when it is known and true.
    pub fn offered(status: EnrollmentStatus, can_withdraw: Option<bool>) -> Option<Action> {
        [Action::Submit, Action::Approve, Action::Withdraw]
            .into_iter()
            .filter(|action| action.source() == status)
            .find(|action| *action != Action::Withdraw || can_withdraw == Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_action_follows_one_edge() {
        for action in [Action::Submit, Action::Approve, Action::Withdraw] {
            assert!(action.source().can_transition_to(action.target()), "{action}");
        }
    }

    #[test]
    fn withdraw_requires_known_positive_eligibility() {
        assert_eq!(Action::offered(EnrollmentStatus::Approved, Some(true)), Some(Action::Withdraw));
        assert_eq!(Action::offered(EnrollmentStatus::Approved, Some(false)), None);
        assert_eq!(Action::offered(EnrollmentStatus::Approved, None), None);
    }

    #[test]
    fn draft_and_submitted_ignore_eligibility() {
        assert_eq!(Action::offered(EnrollmentStatus::Draft, None), Some(Action::Submit));
        assert_eq!(Action::offered(EnrollmentStatus::Submitted, Some(false)), Some(Action::Approve));
    }

    #[test]
    fn nothing_offered_while_withdrawal_is_pending_or_resolved() {
        for status in [
            EnrollmentStatus::WithdrawnRequested,
            EnrollmentStatus::Withdrawn,
            EnrollmentStatus::WithdrawRejected,
        ] {
            assert_eq!(Action::offered(status, Some(true)), None, "{status}");
        }
    }

    #[test]
    fn path_segments() {
        assert_eq!(Action::Submit.path_segment(), "submit");
        assert_eq!(Action::Approve.to_string(), "approve");
        assert_eq!(Action::Withdraw.label(), "Withdraw");
    }
}
