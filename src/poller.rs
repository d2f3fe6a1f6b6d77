//! Poll-until-done driver for video jobs.
//!
//! Synchronous "wait for completion" on top of the manual query surface:
//! sleep a fixed tick, run the throttle guard, query, interpret, repeat until
//! a terminal outcome, the tick budget runs out, or the caller cancels.

use crate::ark::{VideoJobApi, VideoJobRequest};
use crate::config::PollSettings;
use crate::error::{Result, SkapeError};
use crate::status::{interpret, PollOutcome};
use crate::throttle::{ThrottleDecision, ThrottleGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fixed-cadence poll loop. The interpreter's suggested waits are advisory
/// for manual callers; this loop always uses its own tick.
pub struct Poller {
    tick: Duration,
    max_ticks: u32,
}

impl Poller {
    pub fn new(tick: Duration, max_ticks: u32) -> Self {
        Self { tick, max_ticks }
    }

    pub fn from_settings(settings: &PollSettings) -> Self {
        Self::new(Duration::from_secs(settings.tick_secs), settings.max_ticks)
    }

    /// Create a job and poll it to completion, returning the video URL.
    pub async fn create_and_wait(
        &self,
        api: &dyn VideoJobApi,
        guard: &ThrottleGuard,
        request: &VideoJobRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let job_id = api.create_video_job(request, cancel).await?;
        info!(job_id = %job_id, "Polling video job until completion");
        self.wait_for_video(api, guard, &job_id, cancel).await
    }

    /// Poll an existing job until it reaches a terminal outcome.
    ///
    /// Per-tick query failures are logged and retried on the next tick but
    /// still count against the budget. On timeout the remote job is left
    /// untouched; the returned error names the job id so the caller can
    /// resume manual polling.
    pub async fn wait_for_video(
        &self,
        api: &dyn VideoJobApi,
        guard: &ThrottleGuard,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        for tick in 1..=self.max_ticks {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SkapeError::Cancelled),
                _ = tokio::time::sleep(self.tick) => {}
            }

            // The guard runs before any network I/O. A denied tick is a
            // no-op retry, not a failure; the fixed tick is shorter than the
            // throttle window, so this fires when someone else queried the
            // same job in between.
            if let ThrottleDecision::Denied { wait } = guard.check_and_record(job_id) {
                debug!(job_id, wait_secs = wait.as_secs(), "Tick throttled, skipping query");
                continue;
            }

            let snapshot = match api.query_video_job(job_id, cancel).await {
                Ok(snapshot) => snapshot,
                Err(e) if e.is_transient() => {
                    warn!(job_id, tick, error = %e, "Query failed, retrying next tick");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let outcome = interpret(&snapshot, chrono::Utc::now().timestamp());
            info!(
                job_id,
                status = %snapshot.status,
                tick,
                max_ticks = self.max_ticks,
                "Polled video job"
            );

            match outcome {
                PollOutcome::Succeeded { video_url, .. } => {
                    info!(job_id, "Video generation succeeded");
                    return Ok(video_url);
                }
                PollOutcome::SucceededNoResult => {
                    return Err(SkapeError::JobFailed {
                        job_id: job_id.to_string(),
                        state: "completed without a video URL".to_string(),
                    })
                }
                PollOutcome::Failed => {
                    return Err(SkapeError::JobFailed {
                        job_id: job_id.to_string(),
                        state: "failed".to_string(),
                    })
                }
                PollOutcome::Cancelled => {
                    return Err(SkapeError::JobFailed {
                        job_id: job_id.to_string(),
                        state: "cancelled remotely".to_string(),
                    })
                }
                PollOutcome::InProgress { .. } | PollOutcome::Throttled { .. } => {}
                PollOutcome::Unknown { raw_status } => {
                    warn!(job_id, %raw_status, "Unknown job status, continuing to poll");
                }
            }
        }

        Err(SkapeError::Timeout {
            job_id: job_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ark::JobSnapshot;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn snapshot(status: &str, url: Option<&str>) -> JobSnapshot {
        JobSnapshot {
            id: "cgt-test".to_string(),
            status: status.to_string(),
            created_at: Some(chrono::Utc::now().timestamp() - 30),
            updated_at: None,
            video_url: url.map(str::to_string),
            resolution: None,
            ratio: None,
            duration_secs: None,
            fps: None,
            seed: None,
        }
    }

    /// Scripted job API: pops queued query results, repeating the last one.
    struct ScriptedApi {
        queries: Mutex<VecDeque<Result<JobSnapshot>>>,
        last: Mutex<Option<JobSnapshot>>,
        query_count: AtomicUsize,
    }

    impl ScriptedApi {
        fn new(results: Vec<Result<JobSnapshot>>) -> Self {
            Self {
                queries: Mutex::new(results.into()),
                last: Mutex::new(None),
                query_count: AtomicUsize::new(0),
            }
        }

        fn query_count(&self) -> usize {
            self.query_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VideoJobApi for ScriptedApi {
        async fn create_video_job(
            &self,
            _request: &VideoJobRequest,
            _cancel: &CancellationToken,
        ) -> Result<String> {
            Ok("cgt-test".to_string())
        }

        async fn query_video_job(
            &self,
            _handle: &str,
            _cancel: &CancellationToken,
        ) -> Result<JobSnapshot> {
            self.query_count.fetch_add(1, Ordering::SeqCst);
            match self.queries.lock().unwrap().pop_front() {
                Some(Ok(snap)) => {
                    *self.last.lock().unwrap() = Some(snap.clone());
                    Ok(snap)
                }
                Some(Err(e)) => Err(e),
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .ok_or_else(|| SkapeError::Protocol("script exhausted".to_string())),
            }
        }
    }

    fn open_guard() -> ThrottleGuard {
        // Zero interval so the paused-clock loop is never throttled.
        ThrottleGuard::new(Duration::ZERO)
    }

    #[tokio::test(start_paused = true)]
    async fn returns_url_once_job_succeeds() {
        let api = ScriptedApi::new(vec![
            Ok(snapshot("pending", None)),
            Ok(snapshot("running", None)),
            Ok(snapshot("succeeded", Some("https://cdn.example.com/v.mp4"))),
        ]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let url = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/v.mp4");
        assert_eq!(api.query_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_exact_tick_budget() {
        let api = ScriptedApi::new(vec![Ok(snapshot("running", None))]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let err = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Timeout { ref job_id } if job_id == "cgt-test"));
        // One query per tick, no early exit: the job is left to the remote.
        assert_eq!(api.query_count(), 120);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_surfaces_job_id() {
        let api = ScriptedApi::new(vec![
            Ok(snapshot("running", None)),
            Ok(snapshot("failed", None)),
        ]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let err = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            SkapeError::JobFailed { job_id, state } => {
                assert_eq!(job_id, "cgt-test");
                assert_eq!(state, "failed");
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_without_url_is_a_failure() {
        let api = ScriptedApi::new(vec![Ok(snapshot("completed", None))]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let err = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::JobFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_query_errors_consume_budget_but_do_not_abort() {
        let api = ScriptedApi::new(vec![
            Err(SkapeError::Remote {
                status: 500,
                body: "server hiccup".to_string(),
            }),
            Err(SkapeError::Protocol("truncated body".to_string())),
            Ok(snapshot("succeeded", Some("https://cdn.example.com/v.mp4"))),
        ]);
        let poller = Poller::new(Duration::from_secs(5), 4);

        let url = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/v.mp4");
        assert_eq!(api.query_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_query_error_aborts_immediately() {
        let api = ScriptedApi::new(vec![Err(SkapeError::Config("missing key".to_string()))]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let err = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Config(_)));
        assert_eq!(api.query_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_sleep() {
        let api = ScriptedApi::new(vec![Ok(snapshot("running", None))]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller
            .wait_for_video(&api, &open_guard(), "cgt-test", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Cancelled));
        assert_eq!(api.query_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn throttled_ticks_are_noops_that_still_count() {
        // A manual query just before the loop seeds the guard, so every tick
        // inside the (real-time) window is denied: zero network calls, and
        // the budget still runs out.
        let api = ScriptedApi::new(vec![Ok(snapshot("failed", None))]);
        let guard = ThrottleGuard::new(Duration::from_secs(15));
        assert_eq!(guard.check_and_record("cgt-test"), ThrottleDecision::Allowed);

        let poller = Poller::new(Duration::from_secs(5), 3);
        let err = poller
            .wait_for_video(&api, &guard, "cgt-test", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SkapeError::Timeout { .. }));
        assert_eq!(api.query_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn create_and_wait_chains_create_into_polling() {
        let api = ScriptedApi::new(vec![Ok(snapshot(
            "succeeded",
            Some("https://cdn.example.com/v.mp4"),
        ))]);
        let poller = Poller::new(Duration::from_secs(5), 120);

        let url = poller
            .create_and_wait(
                &api,
                &open_guard(),
                &VideoJobRequest::new("sunset over mountains"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/v.mp4");
    }
}
