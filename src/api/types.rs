//! Wire types for the LES enrollment API.
//!
//! All structs use camelCase JSON field names, matching the service's
//! Jackson serialization. Timestamps are ISO-8601 instants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::EnrollmentStatus;

/// Kind of load-modifying resource being enrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// Demand response.
    LmrDr,
    /// Behind-the-meter generation.
    LmrBtmg,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::LmrDr => write!(f, "LMR_DR"),
            ResourceType::LmrBtmg => write!(f, "LMR_BTMG"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LMR_DR" | "DR" => Ok(ResourceType::LmrDr),
            "LMR_BTMG" | "BTMG" => Ok(ResourceType::LmrBtmg),
            other => Err(other.to_string()),
        }
    }
}

/// An enrollment record as held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Database identifier; not used for addressing.
    #[serde(default)]
    pub id: Option<i64>,
    pub lmr_id: String,
    pub lmr_name: String,
    pub market_participant_name: String,
    pub resource_type: ResourceType,
    pub planning_year: String,
    pub status: EnrollmentStatus,
    /// Reason given by MECT for the last rejected withdrawal.
    #[serde(default)]
    pub withdraw_reject_reason: Option<String>,
    #[serde(default)]
    pub withdraw_rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// The rejection annotation is present exactly when the status is WITHDRAW_REJECTED.
    pub fn rejection_is_consistent(&self) -> bool {
        let annotated = self.withdraw_reject_reason.is_some() || self.withdraw_rejected_at.is_some();
        annotated == (self.status == EnrollmentStatus::WithdrawRejected)
    }
}

/// Body of `POST /lmrs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    pub lmr_id: String,
    pub lmr_name: String,
    pub market_participant_name: String,
    pub resource_type: ResourceType,
    pub planning_year: String,
}

/// Server-computed answer to "may a withdrawal be requested now?".
///
/// Never cached across enrollment reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawEligibility {
    #[serde(default)]
    pub lmr_id: String,
    #[serde(default)]
    pub planning_year: String,
    pub can_withdraw: bool,
    /// Explanation shown when `can_withdraw` is false. May be empty.
    #[serde(default)]
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

/// Row of the admin withdrawal-rejection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRejection {
    pub lmr_id: String,
    pub planning_year: String,
    pub lmr_name: String,
    pub market_participant_name: String,
    /// Rejection reason from MECT.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub withdraw_rejected_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Error payload returned by the service on 4xx/5xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
