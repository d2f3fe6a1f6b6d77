//! Interpretation of raw remote job statuses.
//!
//! The remote reports free-form status strings; downstream code only ever
//! sees the closed [`PollOutcome`] enum, decided once here. The mapping is a
//! pure, total function of the snapshot and the current time.

use crate::ark::JobSnapshot;
use serde::Serialize;
use std::time::Duration;

/// Client-facing outcome of one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollOutcome {
    /// The query was stopped by the throttle guard before any network I/O.
    Throttled { wait_secs: u64 },
    /// The job is still pending or running.
    InProgress {
        elapsed_secs: i64,
        /// Advisory next-poll delay for manual callers. The automatic
        /// poll-until-done loop ignores it and uses its own fixed tick.
        suggested_wait_secs: u64,
    },
    /// The job finished and produced a result.
    Succeeded {
        video_url: String,
        resolution: Option<String>,
        ratio: Option<String>,
        duration_secs: Option<i64>,
        fps: Option<i64>,
    },
    /// The job reports completion but returned no media URL.
    SucceededNoResult,
    Failed,
    Cancelled,
    /// Unrecognized status, surfaced verbatim. Non-terminal: polling
    /// continues.
    Unknown { raw_status: String },
}

impl PollOutcome {
    pub fn throttled(wait: Duration) -> Self {
        PollOutcome::Throttled {
            wait_secs: wait.as_secs(),
        }
    }

    /// True when polling should stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollOutcome::Succeeded { .. }
                | PollOutcome::SucceededNoResult
                | PollOutcome::Failed
                | PollOutcome::Cancelled
        )
    }

    /// Render the outcome as caller-facing text, the way the tool surface
    /// reports it.
    pub fn describe(&self, job_id: &str) -> String {
        match self {
            PollOutcome::Throttled { wait_secs } => format!(
                "Query throttled for job {job_id}. Successive queries for the same \
                 job are rate limited; try again in {wait_secs} seconds."
            ),
            PollOutcome::InProgress {
                elapsed_secs,
                suggested_wait_secs,
            } => format!(
                "Job {job_id} is still in progress ({elapsed_secs}s elapsed). \
                 Video generation usually takes 2-5 minutes; query again in \
                 about {suggested_wait_secs} seconds. Polling more often will \
                 not speed it up."
            ),
            PollOutcome::Succeeded {
                video_url,
                resolution,
                ratio,
                duration_secs,
                fps,
            } => {
                let mut text = format!("Job {job_id} succeeded.\nVideo URL: {video_url}");
                if let Some(res) = resolution {
                    text.push_str(&format!("\nResolution: {res}"));
                }
                if let Some(ratio) = ratio {
                    text.push_str(&format!("\nAspect ratio: {ratio}"));
                }
                if let Some(secs) = duration_secs {
                    text.push_str(&format!("\nDuration: {secs}s"));
                }
                if let Some(fps) = fps {
                    text.push_str(&format!("\nFrame rate: {fps} fps"));
                }
                text
            }
            PollOutcome::SucceededNoResult => {
                format!("Job {job_id} completed, but the response contained no video URL.")
            }
            PollOutcome::Failed => format!("Job {job_id} failed."),
            PollOutcome::Cancelled => format!("Job {job_id} was cancelled."),
            PollOutcome::Unknown { raw_status } => {
                format!("Job {job_id} reported status \"{raw_status}\".")
            }
        }
    }
}

/// Map a job snapshot to an outcome, given the current epoch time.
///
/// Total over all status strings: anything unrecognized becomes `Unknown`.
pub fn interpret(snapshot: &JobSnapshot, now_epoch_secs: i64) -> PollOutcome {
    let elapsed_secs = snapshot
        .created_at
        .map(|created| (now_epoch_secs - created).max(0))
        .unwrap_or(0);

    match snapshot.status.to_ascii_lowercase().as_str() {
        "pending" | "running" => PollOutcome::InProgress {
            elapsed_secs,
            suggested_wait_secs: suggested_wait(elapsed_secs),
        },
        "completed" | "succeeded" => match &snapshot.video_url {
            Some(url) if !url.is_empty() => PollOutcome::Succeeded {
                video_url: url.clone(),
                resolution: snapshot.resolution.clone(),
                ratio: snapshot.ratio.clone(),
                duration_secs: snapshot.duration_secs,
                fps: snapshot.fps,
            },
            _ => PollOutcome::SucceededNoResult,
        },
        "failed" => PollOutcome::Failed,
        "canceled" | "cancelled" => PollOutcome::Cancelled,
        _ => PollOutcome::Unknown {
            raw_status: snapshot.status.clone(),
        },
    }
}

/// Advisory next-poll delay, tiered by how long the job has been running.
///
/// Early polls can be sparse because generation rarely finishes in under a
/// minute; later polls tighten once completion is plausible.
fn suggested_wait(elapsed_secs: i64) -> u64 {
    if elapsed_secs < 60 {
        30
    } else if elapsed_secs < 180 {
        20
    } else {
        15
    }
}
