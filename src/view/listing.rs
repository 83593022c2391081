//! Enrollment list and creation form.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::ViewError;
use crate::api::{CreateEnrollmentRequest, Enrollment, LesApi, ResourceType};

const LIST_FAILED: &str = "Failed to load enrollments";
const CREATE_FAILED: &str = "Create failed";

#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub enrollments: Vec<Enrollment>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct EnrollmentList<A: LesApi> {
    api: Arc<A>,
    state: ListState,
}

impl<A: LesApi> EnrollmentList<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: ListState {
                loading: true,
                ..Default::default()
            },
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub async fn load(&mut self) -> Result<&[Enrollment], ViewError> {
        self.state.loading = true;
        match self.api.list_enrollments().await {
            Ok(list) => {
                self.state.enrollments = list;
                self.state.error = None;
                self.state.loading = false;
                Ok(&self.state.enrollments)
            }
            Err(err) => {
                let message = err.user_message(LIST_FAILED);
                warn!(error = %err, "failed to load enrollments");
                self.state.error = Some(message.clone());
                self.state.loading = false;
                Err(ViewError::Load(message))
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("unknown resource type {0:?} (expected LMR_DR or LMR_BTMG)")]
    ResourceType(String),
}

/// Raw user input for a new enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub lmr_id: String,
    pub lmr_name: String,
    pub market_participant_name: String,
    pub resource_type: String,
    pub planning_year: String,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            lmr_id: String::new(),
            lmr_name: String::new(),
            market_participant_name: String::new(),
            resource_type: ResourceType::LmrDr.to_string(),
            planning_year: String::new(),
        }
    }
}

impl CreateForm {
    /// Trims and checks every field, producing the request body.
    pub fn validate(&self) -> Result<CreateEnrollmentRequest, FormError> {
        let lmr_id = required("lmrId", &self.lmr_id)?;
        let lmr_name = required("lmrName", &self.lmr_name)?;
        let market_participant_name =
            required("marketParticipantName", &self.market_participant_name)?;
        let resource_type = required("resourceType", &self.resource_type)?
            .parse::<ResourceType>()
            .map_err(FormError::ResourceType)?;
        let planning_year = required("planningYear", &self.planning_year)?;

        Ok(CreateEnrollmentRequest {
            lmr_id,
            lmr_name,
            market_participant_name,
            resource_type,
            planning_year,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

/// Validates `form` and creates the enrollment. Invalid input never reaches the server.
pub async fn create_enrollment<A: LesApi>(api: &A, form: &CreateForm) -> Result<Enrollment, ViewError> {
    let req = form.validate()?;
    match api.create_enrollment(&req).await {
        Ok(created) => {
            info!(lmr_id = %created.lmr_id, status = %created.status, "enrollment created");
            Ok(created)
        }
        Err(err) => {
            warn!(lmr_id = %req.lmr_id, error = %err, "failed to create enrollment");
            Err(ViewError::Load(err.user_message(CREATE_FAILED)))
        }
    }
}
