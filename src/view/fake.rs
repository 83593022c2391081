//! In-memory stand-in for the LES service used by view tests.
//!
//! Applies the same lifecycle rules as the real service so tests can script
//! MECT's asynchronous resolution with [`FakeApi::set_status`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use crate::api::{
    AdminCredentials, ApiError, CreateEnrollmentRequest, Enrollment, LesApi, ResourceType,
    WithdrawEligibility, WithdrawRejection,
};
use crate::lifecycle::{Action, EnrollmentStatus};

pub(crate) const ADMIN_USER: &str = "admin";
pub(crate) const ADMIN_PASSWORD: &str = "s3cret";

pub(crate) fn enrollment(lmr_id: &str, status: EnrollmentStatus) -> Enrollment {
    let now = Utc::now();
    let rejected = status == EnrollmentStatus::WithdrawRejected;
    Enrollment {
        id: Some(1),
        lmr_id: lmr_id.to_string(),
        lmr_name: "N".into(),
        market_participant_name: "P".into(),
        resource_type: ResourceType::LmrDr,
        planning_year: "2026".into(),
        status,
        withdraw_reject_reason: None,
        withdraw_rejected_at: rejected.then_some(now),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn eligibility(lmr_id: &str, can_withdraw: bool, message: &str) -> WithdrawEligibility {
    WithdrawEligibility {
        lmr_id: lmr_id.to_string(),
        planning_year: "2026".into(),
        can_withdraw,
        message: message.to_string(),
        updated_at: Utc::now(),
    }
}

fn api_error(status: u16, message: &str) -> ApiError {
    ApiError::Api {
        status,
        message: Some(message.to_string()),
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    records: Mutex<BTreeMap<String, Enrollment>>,
    eligibility: Mutex<HashMap<String, WithdrawEligibility>>,
    fail_gets: AtomicBool,
    fail_creates: AtomicBool,
    fail_rejection_listing: AtomicBool,
    fail_next_transition: Mutex<Option<ApiError>>,
    get_delay: Mutex<Duration>,
    eligibility_delay: Mutex<Duration>,
    get_calls: AtomicUsize,
    eligibility_calls: AtomicUsize,
    transition_calls: AtomicUsize,
}

impl FakeApi {
    pub(crate) fn with_enrollment(lmr_id: &str, status: EnrollmentStatus) -> Self {
        let api = Self::default();
        api.insert(enrollment(lmr_id, status));
        api
    }

    pub(crate) fn insert(&self, enrollment: Enrollment) {
        self.records
            .lock()
            .unwrap()
            .insert(enrollment.lmr_id.clone(), enrollment);
    }

    /// Moves a record as MECT or another user would.
    pub(crate) fn set_status(&self, lmr_id: &str, status: EnrollmentStatus) {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(lmr_id).unwrap();
        record.status = status;
        record.updated_at = Utc::now();
        if status == EnrollmentStatus::WithdrawRejected {
            record.withdraw_reject_reason = Some("State changed in MECT".into());
            record.withdraw_rejected_at = Some(record.updated_at);
        } else {
            record.withdraw_reject_reason = None;
            record.withdraw_rejected_at = None;
        }
    }

    pub(crate) fn status_of(&self, lmr_id: &str) -> Option<EnrollmentStatus> {
        self.records.lock().unwrap().get(lmr_id).map(|e| e.status)
    }

    pub(crate) fn set_eligibility(&self, lmr_id: &str, el: WithdrawEligibility) {
        self.eligibility.lock().unwrap().insert(lmr_id.to_string(), el);
    }

    pub(crate) fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_rejection_listing(&self, fail: bool) {
        self.fail_rejection_listing.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_eligibility_delay(&self, delay: Duration) {
        *self.eligibility_delay.lock().unwrap() = delay;
    }

    pub(crate) fn fail_next_transition(&self, err: ApiError) {
        *self.fail_next_transition.lock().unwrap() = Some(err);
    }

    pub(crate) fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = delay;
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn eligibility_calls(&self) -> usize {
        self.eligibility_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn transition_calls(&self) -> usize {
        self.transition_calls.load(Ordering::SeqCst)
    }
}

impl LesApi for FakeApi {
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn get_enrollment(&self, lmr_id: &str) -> Result<Enrollment, ApiError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.get_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 503,
                message: None,
            });
        }
        self.records
            .lock()
            .unwrap()
            .get(lmr_id)
            .cloned()
            .ok_or_else(|| api_error(404, "LMR not found"))
    }

    async fn create_enrollment(
        &self,
        req: &CreateEnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 500,
                message: None,
            });
        }
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&req.lmr_id) {
            return Err(api_error(409, "LMR already enrolled"));
        }
        let mut created = enrollment(&req.lmr_id, EnrollmentStatus::Draft);
        created.lmr_name = req.lmr_name.clone();
        created.market_participant_name = req.market_participant_name.clone();
        created.resource_type = req.resource_type;
        created.planning_year = req.planning_year.clone();
        records.insert(req.lmr_id.clone(), created.clone());
        Ok(created)
    }

    async fn transition(&self, lmr_id: &str, action: Action) -> Result<Enrollment, ApiError> {
        self.transition_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next_transition.lock().unwrap().take() {
            return Err(err);
        }
        let can_withdraw = self
            .eligibility
            .lock()
            .unwrap()
            .get(lmr_id)
            .map(|e| e.can_withdraw)
            .unwrap_or(false);

        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(lmr_id)
            .ok_or_else(|| api_error(404, "LMR not found"))?;
        if record.status != action.source() {
            return Err(api_error(
                409,
                &format!("Cannot {action} enrollment in status {}", record.status),
            ));
        }
        if action == Action::Withdraw && !can_withdraw {
            return Err(api_error(409, "Withdrawal is not currently allowed"));
        }
        record.status = action.target();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn withdraw_eligibility(&self, lmr_id: &str) -> Result<WithdrawEligibility, ApiError> {
        self.eligibility_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.eligibility_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.eligibility
            .lock()
            .unwrap()
            .get(lmr_id)
            .cloned()
            .ok_or_else(|| api_error(404, "LMR not found"))
    }

    async fn list_withdraw_rejections(&self) -> Result<Vec<WithdrawRejection>, ApiError> {
        if self.fail_rejection_listing.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 503,
                message: None,
            });
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.status == EnrollmentStatus::WithdrawRejected)
            .map(|e| WithdrawRejection {
                lmr_id: e.lmr_id.clone(),
                planning_year: e.planning_year.clone(),
                lmr_name: e.lmr_name.clone(),
                market_participant_name: e.market_participant_name.clone(),
                message: e.withdraw_reject_reason.clone(),
                withdraw_rejected_at: e.withdraw_rejected_at,
                updated_at: e.updated_at,
            })
            .collect())
    }

    async fn correct_withdrawal(
        &self,
        lmr_id: &str,
        credentials: &AdminCredentials,
    ) -> Result<Enrollment, ApiError> {
        if credentials.username() != ADMIN_USER || credentials.password() != ADMIN_PASSWORD {
            return Err(ApiError::Api {
                status: 401,
                message: None,
            });
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(lmr_id)
            .ok_or_else(|| api_error(404, "LMR not found"))?;
        if record.status != EnrollmentStatus::WithdrawRejected {
            return Err(api_error(
                409,
                "Only enrollments in WITHDRAW_REJECTED can be corrected",
            ));
        }
        record.status = EnrollmentStatus::Approved;
        record.withdraw_reject_reason = None;
        record.withdraw_rejected_at = None;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}
