//! Video command implementations: create, query, wait.

use crate::cli::{Output, VideoArgs};
use crate::config::Settings;
use crate::service::MediaService;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Run `video create`: submit the job and print the task ID.
pub async fn run_video_create(args: &VideoArgs, settings: Settings) -> Result<()> {
    let service = MediaService::new(settings);
    let request = args.to_request();

    let spinner = Output::spinner("Creating video job...");
    match service
        .create_video_job(&request, &CancellationToken::new())
        .await
    {
        Ok(job_id) => {
            spinner.finish_and_clear();
            Output::success("Video job created");
            Output::kv("Prompt", &args.prompt);
            Output::kv("Size", &format!("{}x{}", args.width, args.height));
            Output::kv("Duration", &format!("{}s", args.duration));
            Output::kv("Task ID", &job_id);
            Output::info(&format!(
                "Check progress with: skape video query {}",
                job_id
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to create video job: {}", e));
            Err(e.into())
        }
    }
}

/// Run `video query`: one throttle-gated status query.
pub async fn run_video_query(task_id: &str, settings: Settings) -> Result<()> {
    let service = MediaService::new(settings);

    match service
        .query_video_job(task_id, &CancellationToken::new())
        .await
    {
        Ok(outcome) => {
            println!("{}", outcome.describe(task_id));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to query job: {}", e));
            Err(e.into())
        }
    }
}

/// Run `video wait`: create a job and poll until the video is ready.
/// Ctrl-C cancels the wait; the remote job keeps running and can still be
/// queried manually.
pub async fn run_video_wait(args: &VideoArgs, settings: Settings) -> Result<()> {
    let service = MediaService::new(settings);
    let request = args.to_request();

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let spinner = Output::spinner("Generating video (this usually takes 2-5 minutes)...");

    match service.create_and_wait_video(&request, &cancel).await {
        Ok(url) => {
            spinner.finish_and_clear();
            Output::success("Video generated");
            Output::kv("Prompt", &args.prompt);
            Output::kv("URL", &url);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            Err(e.into())
        }
    }
}
