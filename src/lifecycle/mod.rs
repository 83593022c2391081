mod action;
mod status;

pub use action::Action;
pub use status::{EnrollmentStatus, StatusMachine, Transition};
