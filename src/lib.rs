//! Skape - Generative Media Tools
//!
//! A CLI tool and MCP server for generating images and videos through the
//! Ark generative-media API.
//!
//! The name "Skape" comes from the Norwegian word for "create."
//!
//! # Overview
//!
//! Skape lets you:
//! - Generate images synchronously from text prompts
//! - Create long-running video generation jobs and poll them to completion
//! - Expose both as MCP tools for AI assistants, or over HTTP
//!
//! Video generation is asynchronous on the remote side: creating a job
//! returns an opaque task id, and status queries for the same job are
//! throttled to one per 15 seconds. The poll-until-done driver wraps this
//! into synchronous "wait for the URL" semantics bounded by a 10 minute
//! budget.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `ark` - Remote job client for the Ark API
//! - `throttle` - Per-job query throttling
//! - `status` - Interpretation of raw job statuses into [`status::PollOutcome`]
//! - `poller` - Poll-until-done driver
//! - `service` - Shared facade used by every surface
//! - `mcp` - MCP server (JSON-RPC over stdio)
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use skape::ark::VideoJobRequest;
//! use skape::config::Settings;
//! use skape::service::MediaService;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = MediaService::new(Settings::load()?);
//!     let request = VideoJobRequest::new("sunset over mountains");
//!     let url = service
//!         .create_and_wait_video(&request, &CancellationToken::new())
//!         .await?;
//!     println!("Video ready: {url}");
//!     Ok(())
//! }
//! ```

pub mod ark;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod poller;
pub mod service;
pub mod status;
pub mod throttle;

pub use error::{Result, SkapeError};
