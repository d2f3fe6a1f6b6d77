//! HTTP client for the Ark generative-media API.
//!
//! Pure request/response: no state beyond the HTTP call itself. The
//! credential is checked before any network I/O, and every call carries a
//! per-call timeout plus a cancellation token that aborts in-flight requests.

use super::types::{
    CreateJobResponse, ImageRequest, ImageResponse, JobSnapshot, QueryJobResponse, VideoJobRequest,
};
use crate::config::ApiSettings;
use crate::error::{Result, SkapeError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// The create/query seam for long-running video jobs.
///
/// The poll-until-done driver works against this trait so it can be tested
/// without a network.
#[async_trait]
pub trait VideoJobApi: Send + Sync {
    /// Create a video generation job and return its opaque identifier.
    async fn create_video_job(
        &self,
        request: &VideoJobRequest,
        cancel: &CancellationToken,
    ) -> Result<String>;

    /// Query the status of a previously created job.
    ///
    /// Safe to call concurrently for different handles.
    async fn query_video_job(
        &self,
        handle: &str,
        cancel: &CancellationToken,
    ) -> Result<JobSnapshot>;
}

/// Client for the Ark image and video generation endpoints.
pub struct ArkClient {
    http: Client,
    settings: ApiSettings,
}

impl ArkClient {
    pub fn new(settings: ApiSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Generate an image synchronously and return its URL.
    ///
    /// Sibling of the video job surface; blocks until the remote call
    /// returns or the per-call timeout elapses.
    #[instrument(skip(self, request, cancel), fields(size = %format!("{}x{}", request.width, request.height)))]
    pub async fn generate_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let api_key = self.settings.resolve_api_key()?;

        info!("Requesting image generation");

        let req = self
            .http
            .post(format!("{}/images/generations", self.settings.endpoint))
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.settings.image_timeout_secs))
            .json(&request.to_body(&self.settings.image_model));

        let response = self.execute(req, cancel).await?;
        let body: ImageResponse = parse_body(response).await?;

        match body.data.into_iter().next() {
            Some(datum) if !datum.url.is_empty() => {
                info!("Image generated");
                Ok(datum.url)
            }
            _ => Err(SkapeError::Protocol(
                "image response contained no image URL".to_string(),
            )),
        }
    }

    async fn execute(&self, req: RequestBuilder, cancel: &CancellationToken) -> Result<Response> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SkapeError::Cancelled),
            result = req.send() => Ok(result?),
        }
    }
}

#[async_trait]
impl VideoJobApi for ArkClient {
    #[instrument(skip(self, request, cancel), fields(duration = request.duration_secs))]
    async fn create_video_job(
        &self,
        request: &VideoJobRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let api_key = self.settings.resolve_api_key()?;

        info!(
            "Creating video job ({}x{}, {}s)",
            request.width, request.height, request.duration_secs
        );

        let req = self
            .http
            .post(format!(
                "{}/contents/generations/tasks",
                self.settings.endpoint
            ))
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.settings.create_timeout_secs))
            .json(&request.to_body(&self.settings.video_model));

        let response = self.execute(req, cancel).await?;
        let body: CreateJobResponse = parse_body(response).await?;

        if body.id.is_empty() {
            return Err(SkapeError::Protocol(
                "create response contained no job id".to_string(),
            ));
        }

        info!(job_id = %body.id, "Video job created");
        Ok(body.id)
    }

    #[instrument(skip(self, cancel))]
    async fn query_video_job(
        &self,
        handle: &str,
        cancel: &CancellationToken,
    ) -> Result<JobSnapshot> {
        let api_key = self.settings.resolve_api_key()?;

        let req = self
            .http
            .get(format!(
                "{}/contents/generations/tasks/{}",
                self.settings.endpoint, handle
            ))
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.settings.query_timeout_secs));

        let response = self.execute(req, cancel).await?;
        let body: QueryJobResponse = parse_body(response).await?;
        let snapshot = body.into_snapshot(handle);

        debug!(job_id = %snapshot.id, status = %snapshot.status, "Queried video job");
        Ok(snapshot)
    }
}

/// Read a response body, mapping non-2xx to `Remote` and bad JSON to
/// `Protocol`.
async fn parse_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(SkapeError::Remote {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| SkapeError::Protocol(format!("cannot parse response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_credential() -> ArkClient {
        let mut settings = ApiSettings::default();
        // Guard against an ambient credential leaking into the test.
        settings.api_key = Some(String::new());
        settings.endpoint = "http://127.0.0.1:1".to_string();
        ArkClient::new(settings)
    }

    #[tokio::test]
    async fn create_without_credential_is_config_error() {
        // The unroutable endpoint would surface as Transport if any network
        // call were attempted; Config proves the check happens first.
        std::env::remove_var(crate::config::API_KEY_ENV);
        let client = client_without_credential();
        let err = client
            .create_video_job(&VideoJobRequest::new("p"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Config(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn query_without_credential_is_config_error() {
        std::env::remove_var(crate::config::API_KEY_ENV);
        let client = client_without_credential();
        let err = client
            .query_video_job("cgt-1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Config(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn pre_cancelled_token_aborts_before_transport() {
        let mut settings = ApiSettings::default();
        settings.api_key = Some("test-key".to_string());
        settings.endpoint = "http://127.0.0.1:1".to_string();
        let client = ArkClient::new(settings);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .query_video_job("cgt-1", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Cancelled), "got {err:?}");
    }
}
