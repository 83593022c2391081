use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ViewError;
use crate::api::{AdminCredentials, Enrollment, LesApi, WithdrawRejection};

const LOAD_FAILED: &str = "Failed to load rejections";
const CORRECTION_FAILED: &str = "Failed to correct enrollment state.";

#[derive(Debug, Clone, Default)]
pub struct RejectionsState {
    pub list: Vec<WithdrawRejection>,
    pub loading: bool,
    pub error: Option<String>,
    /// `lmrId` whose correction is in flight.
    pub correcting: Option<String>,
    pub action_error: Option<String>,
    pub action_success: Option<String>,
}

/// Admin screen listing withdrawals rejected by MECT.
pub struct RejectionsView<A: LesApi> {
    api: Arc<A>,
    state: RejectionsState,
}

impl<A: LesApi> RejectionsView<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RejectionsState {
                loading: true,
                ..Default::default()
            },
        }
    }

    pub fn state(&self) -> &RejectionsState {
        &self.state
    }

    pub async fn load(&mut self) -> Result<&[WithdrawRejection], ViewError> {
        self.state.loading = true;
        match self.api.list_withdraw_rejections().await {
            Ok(list) => {
                self.state.list = list;
                self.state.error = None;
                self.state.loading = false;
                Ok(&self.state.list)
            }
            Err(err) => {
                let message = err.user_message(LOAD_FAILED);
                warn!(error = %err, "failed to load withdrawal rejections");
                self.state.error = Some(message.clone());
                self.state.loading = false;
                Err(ViewError::Load(message))
            }
        }
    }

    /// Restores a WITHDRAW_REJECTED enrollment to APPROVED.
    ///
    /// `credentials` are consumed by this call and dropped when it returns.
    /// The listing is reloaded afterwards whether or not the call succeeded.
    pub async fn correct(
        &mut self,
        lmr_id: &str,
        credentials: AdminCredentials,
    ) -> Result<Enrollment, ViewError> {
        self.state.correcting = Some(lmr_id.to_string());
        self.state.action_error = None;
        self.state.action_success = None;

        let result = self.api.correct_withdrawal(lmr_id, &credentials).await;
        drop(credentials);
        self.state.correcting = None;

        let outcome = match result {
            Ok(enrollment) => {
                info!(lmr_id, status = %enrollment.status, "withdrawal rejection corrected");
                self.state.action_success =
                    Some(format!("Enrollment {lmr_id} has been restored to APPROVED."));
                Ok(enrollment)
            }
            Err(err) => {
                let message = err.user_message(CORRECTION_FAILED);
                warn!(lmr_id, error = %err, "withdrawal correction failed");
                self.state.action_error = Some(message.clone());
                Err(ViewError::Correction(message))
            }
        };

        if let Err(reload) = self.load().await {
            debug!(error = %reload, "reload after correction failed");
        }
        outcome
    }
}
