//! Skape CLI entry point.

use anyhow::Result;
use clap::Parser;
use skape::cli::{commands, Cli, Commands, VideoAction};
use skape::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("skape={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match &cli.command {
        Commands::Image {
            prompt,
            width,
            height,
            seed,
            watermark,
        } => {
            commands::run_image(prompt, *width, *height, *seed, *watermark, settings).await?;
        }

        Commands::Video { action } => match action {
            VideoAction::Create(args) => {
                commands::run_video_create(args, settings).await?;
            }
            VideoAction::Query { task_id } => {
                commands::run_video_query(task_id, settings).await?;
            }
            VideoAction::Wait(args) => {
                commands::run_video_wait(args, settings).await?;
            }
        },

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Mcp => {
            commands::run_mcp(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
