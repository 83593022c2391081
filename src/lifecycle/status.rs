use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an LMR enrollment.
///
/// Each enrollment flows through:
/// DRAFT → SUBMITTED → APPROVED → WITHDRAWN_REQUESTED → {WITHDRAWN | WITHDRAW_REJECTED}
///
/// WITHDRAW_REJECTED can be returned to APPROVED by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Draft,
    Submitted,
    Approved,
    WithdrawnRequested,
    Withdrawn,
    WithdrawRejected,
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatus::Draft => write!(f, "DRAFT"),
            EnrollmentStatus::Submitted => write!(f, "SUBMITTED"),
            EnrollmentStatus::Approved => write!(f, "APPROVED"),
            EnrollmentStatus::WithdrawnRequested => write!(f, "WITHDRAWN_REQUESTED"),
            EnrollmentStatus::Withdrawn => write!(f, "WITHDRAWN"),
            EnrollmentStatus::WithdrawRejected => write!(f, "WITHDRAW_REJECTED"),
        }
    }
}

impl EnrollmentStatus {
    /// Statuses in which the server can move the record without a client action:
    /// eligibility changes while APPROVED, MECT resolves WITHDRAWN_REQUESTED.
    pub fn is_pollable(self) -> bool {
        matches!(
            self,
            EnrollmentStatus::Approved | EnrollmentStatus::WithdrawnRequested
        )
    }

    /// Statuses for which a withdraw-eligibility projection is fetched.
    pub fn has_eligibility(self) -> bool {
        matches!(
            self,
            EnrollmentStatus::Approved
                | EnrollmentStatus::Withdrawn
                | EnrollmentStatus::WithdrawnRequested
                | EnrollmentStatus::WithdrawRejected
        )
    }

    /// WITHDRAWN and WITHDRAW_REJECTED end a withdrawal attempt.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EnrollmentStatus::Withdrawn | EnrollmentStatus::WithdrawRejected
        )
    }

    /// Statuses directly reachable from `self`.
    pub fn successors(self) -> &'static [EnrollmentStatus] {
        match self {
            EnrollmentStatus::Draft => &[EnrollmentStatus::Submitted],
            EnrollmentStatus::Submitted => &[EnrollmentStatus::Approved],
            EnrollmentStatus::Approved => &[EnrollmentStatus::WithdrawnRequested],
            EnrollmentStatus::WithdrawnRequested => &[
                EnrollmentStatus::Withdrawn,
                EnrollmentStatus::WithdrawRejected,
            ],
            EnrollmentStatus::Withdrawn => &[],
            EnrollmentStatus::WithdrawRejected => &[EnrollmentStatus::Approved],
        }
    }

    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        self.successors().contains(&next)
    }
}

/// How a newly adopted server status relates to the one previously held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First record seen by the view.
    Initial(EnrollmentStatus),
    /// Same status as before.
    Unchanged(EnrollmentStatus),
    /// A single edge of the lifecycle graph.
    Advanced {
        from: EnrollmentStatus,
        to: EnrollmentStatus,
    },
    /// The server skipped or reversed edges (e.g. two steps between polls).
    Unexpected {
        from: EnrollmentStatus,
        to: EnrollmentStatus,
    },
}

/// Classifies status changes reported by the server.
///
/// The client never computes a transition itself; the server record is always
/// adopted. This only labels what was observed so it can be logged.
pub struct StatusMachine;

impl StatusMachine {
    pub fn observe(previous: Option<EnrollmentStatus>, next: EnrollmentStatus) -> Transition {
        match previous {
            None => Transition::Initial(next),
            Some(from) if from == next => Transition::Unchanged(next),
            Some(from) if from.can_transition_to(next) => Transition::Advanced { from, to: next },
            Some(from) => Transition::Unexpected { from, to: next },
        }
    }
}
