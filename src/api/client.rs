use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::credentials::AdminCredentials;
use super::error::ApiError;
use super::types::{
    CreateEnrollmentRequest, Enrollment, ErrorBody, WithdrawEligibility, WithdrawRejection,
};
use crate::lifecycle::Action;

/// Default API root of a local LES service.
pub const DEFAULT_API_URL: &str = "http://localhost:8081/api";

/// Operations of the LES API consumed by the views.
///
/// Implemented by [`LesClient`] over HTTP and by in-memory fakes in tests.
/// Futures are `Send` so the poll loop can run as a spawned task.
pub trait LesApi: Send + Sync + 'static {
    fn list_enrollments(&self) -> impl Future<Output = Result<Vec<Enrollment>, ApiError>> + Send;

    fn get_enrollment(
        &self,
        lmr_id: &str,
    ) -> impl Future<Output = Result<Enrollment, ApiError>> + Send;

    fn create_enrollment(
        &self,
        req: &CreateEnrollmentRequest,
    ) -> impl Future<Output = Result<Enrollment, ApiError>> + Send;

    /// `POST /lmrs/{lmrId}/{submit|approve|withdraw}`.
    fn transition(
        &self,
        lmr_id: &str,
        action: Action,
    ) -> impl Future<Output = Result<Enrollment, ApiError>> + Send;

    fn withdraw_eligibility(
        &self,
        lmr_id: &str,
    ) -> impl Future<Output = Result<WithdrawEligibility, ApiError>> + Send;

    fn list_withdraw_rejections(
        &self,
    ) -> impl Future<Output = Result<Vec<WithdrawRejection>, ApiError>> + Send;

    /// Restores a WITHDRAW_REJECTED enrollment to APPROVED.
    fn correct_withdrawal(
        &self,
        lmr_id: &str,
        credentials: &AdminCredentials,
    ) -> impl Future<Output = Result<Enrollment, ApiError>> + Send;

    fn submit(&self, lmr_id: &str) -> impl Future<Output = Result<Enrollment, ApiError>> + Send {
        self.transition(lmr_id, Action::Submit)
    }

    fn approve(&self, lmr_id: &str) -> impl Future<Output = Result<Enrollment, ApiError>> + Send {
        self.transition(lmr_id, Action::Approve)
    }

    fn withdraw(&self, lmr_id: &str) -> impl Future<Output = Result<Enrollment, ApiError>> + Send {
        self.transition(lmr_id, Action::Withdraw)
    }
}

/// HTTP client for the LES API.
#[derive(Debug, Clone)]
pub struct LesClient {
    http: Client,
    base_url: Url,
}

impl LesClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(endpoint, "calling LES API");
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty());
            debug!(endpoint, status = status.as_u16(), ?message, "LES API returned an error");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: Url,
        credentials: Option<&AdminCredentials>,
    ) -> Result<T, ApiError> {
        let mut request = self.http.post(url).json(&serde_json::json!({}));
        if let Some(creds) = credentials {
            request = request.basic_auth(creds.username(), Some(creds.password()));
        }
        self.execute(endpoint, request).await
    }
}

impl LesApi for LesClient {
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        let url = self.endpoint(&["lmrs"])?;
        self.execute("GET /lmrs", self.http.get(url)).await
    }

    async fn get_enrollment(&self, lmr_id: &str) -> Result<Enrollment, ApiError> {
        let url = self.endpoint(&["lmrs", lmr_id])?;
        self.execute("GET /lmrs/{lmrId}", self.http.get(url)).await
    }

    async fn create_enrollment(
        &self,
        req: &CreateEnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        let url = self.endpoint(&["lmrs"])?;
        self.execute("POST /lmrs", self.http.post(url).json(req)).await
    }

    async fn transition(&self, lmr_id: &str, action: Action) -> Result<Enrollment, ApiError> {
        let url = self.endpoint(&["lmrs", lmr_id, action.path_segment()])?;
        let endpoint = format!("POST /lmrs/{{lmrId}}/{}", action.path_segment());
        self.post_empty(&endpoint, url, None).await
    }

    async fn withdraw_eligibility(&self, lmr_id: &str) -> Result<WithdrawEligibility, ApiError> {
        let url = self.endpoint(&["lmrs", lmr_id, "withdraw-eligibility"])?;
        self.execute("GET /lmrs/{lmrId}/withdraw-eligibility", self.http.get(url))
            .await
    }

    async fn list_withdraw_rejections(&self) -> Result<Vec<WithdrawRejection>, ApiError> {
        let url = self.endpoint(&["admin", "withdraw-rejections"])?;
        self.execute("GET /admin/withdraw-rejections", self.http.get(url))
            .await
    }

    async fn correct_withdrawal(
        &self,
        lmr_id: &str,
        credentials: &AdminCredentials,
    ) -> Result<Enrollment, ApiError> {
        let url = self.endpoint(&["admin", "lmrs", lmr_id, "correct-withdrawal"])?;
        self.post_empty(
            "POST /admin/lmrs/{lmrId}/correct-withdrawal",
            url,
            Some(credentials),
        )
        .await
    }
}
