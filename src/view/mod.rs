//! Screen-level controllers for the LES client.
//!
//! Each view owns the state a screen renders and the operations a user can
//! trigger on it. The enrollment detail view also owns the poll loop that
//! reconciles the displayed record with the server.

mod admin;
mod detail;
mod listing;
mod poller;
mod state;

#[cfg(test)]
pub(crate) mod fake;

use thiserror::Error;

pub use admin::RejectionsView;
pub use detail::EnrollmentView;
pub use listing::{CreateForm, EnrollmentList, FormError, create_enrollment};
pub use state::{DetailState, Notice, NoticeKind};

use crate::lifecycle::{Action, EnrollmentStatus};

/// Failure surfaced by a view operation. The display text is what the user sees.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{0}")]
    Load(String),

    #[error("{message}")]
    Action { action: Action, message: String },

    #[error("{} is not available for {}", .action.label(), status_text(.status))]
    NotOffered {
        action: Action,
        status: Option<EnrollmentStatus>,
    },

    #[error("view has been closed")]
    TornDown,

    #[error("{0}")]
    Correction(String),

    #[error("{0}")]
    Form(#[from] FormError),
}

fn status_text(status: &Option<EnrollmentStatus>) -> String {
    match status {
        Some(status) => format!("an enrollment in {status}"),
        None => "an enrollment that is not loaded".to_string(),
    }
}
