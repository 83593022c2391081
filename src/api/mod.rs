pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

pub use client::{DEFAULT_API_URL, LesApi, LesClient};
pub use credentials::AdminCredentials;
pub use error::ApiError;
pub use types::{
    CreateEnrollmentRequest, Enrollment, ResourceType, WithdrawEligibility, WithdrawRejection,
};
