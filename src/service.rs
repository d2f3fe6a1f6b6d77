//! Shared media-generation service.
//!
//! Single entry point used by every surface (MCP tools, HTTP handlers, CLI
//! commands): it owns the Ark client, the per-job throttle guard, and the
//! poll-until-done driver, and guarantees that a throttled query performs no
//! network I/O and that raw statuses are interpreted exactly once.

use crate::ark::{ArkClient, ImageRequest, VideoJobApi, VideoJobRequest};
use crate::config::Settings;
use crate::error::Result;
use crate::poller::Poller;
use crate::status::{interpret, PollOutcome};
use crate::throttle::{ThrottleDecision, ThrottleGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct MediaService {
    client: Arc<ArkClient>,
    video_api: Arc<dyn VideoJobApi>,
    guard: ThrottleGuard,
    poller: Poller,
}

impl MediaService {
    pub fn new(settings: Settings) -> Self {
        let client = Arc::new(ArkClient::new(settings.api.clone()));
        Self {
            video_api: client.clone(),
            client,
            guard: ThrottleGuard::new(Duration::from_secs(settings.throttle.min_interval_secs)),
            poller: Poller::from_settings(&settings.poll),
        }
    }

    /// Swap the video job backend, for tests.
    #[cfg(test)]
    fn with_video_api(mut self, api: Arc<dyn VideoJobApi>) -> Self {
        self.video_api = api;
        self
    }

    /// Generate an image synchronously, returning its URL.
    pub async fn generate_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.client.generate_image(request, cancel).await
    }

    /// Create a video job, returning its opaque identifier.
    pub async fn create_video_job(
        &self,
        request: &VideoJobRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.video_api.create_video_job(request, cancel).await
    }

    /// Query a video job once.
    ///
    /// The throttle guard runs before any network I/O; a denied query
    /// returns `PollOutcome::Throttled` without touching the network. The
    /// credential is resolved ahead of the guard so a misconfigured query
    /// does not consume the job's window: the caller keeps seeing the
    /// configuration error, and a retry after fixing it is not throttled.
    pub async fn query_video_job(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome> {
        self.client.settings().resolve_api_key()?;

        if let ThrottleDecision::Denied { wait } = self.guard.check_and_record(job_id) {
            return Ok(PollOutcome::throttled(wait));
        }

        let snapshot = self.video_api.query_video_job(job_id, cancel).await?;
        Ok(interpret(&snapshot, chrono::Utc::now().timestamp()))
    }

    /// Create a video job and poll it to completion, returning the video URL.
    pub async fn create_and_wait_video(
        &self,
        request: &VideoJobRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.poller
            .create_and_wait(self.video_api.as_ref(), &self.guard, request, cancel)
            .await
    }

    /// Poll an existing job to completion, returning the video URL.
    pub async fn wait_for_video(&self, job_id: &str, cancel: &CancellationToken) -> Result<String> {
        self.poller
            .wait_for_video(self.video_api.as_ref(), &self.guard, job_id, cancel)
            .await
    }
}
