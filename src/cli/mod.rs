//! CLI module for Skape.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Args, Parser, Subcommand};

/// Skape - Generative Media Tools
///
/// A CLI tool and MCP server for generating images and videos through the
/// Ark generative-media API. The name "Skape" comes from the Norwegian word
/// for "create."
#[derive(Parser, Debug)]
#[command(name = "skape")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an image from a text prompt
    Image {
        /// Text description of the image
        prompt: String,

        /// Image width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value_t = 1024)]
        height: u32,

        /// Random seed for reproducible results
        #[arg(long)]
        seed: Option<i64>,

        /// Add a watermark to the image
        #[arg(long)]
        watermark: bool,
    },

    /// Create, query, or wait for video generation jobs
    Video {
        #[command(subcommand)]
        action: VideoAction,
    },

    /// Check credentials and configuration
    Doctor,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Run as an MCP server (JSON-RPC over stdio)
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum VideoAction {
    /// Create a video job and print its task ID without waiting
    Create(VideoArgs),

    /// Query the status of a video job once
    Query {
        /// Task ID returned by `video create`
        task_id: String,
    },

    /// Create a video job and poll it until the video is ready
    Wait(VideoArgs),
}

/// Shared arguments for video generation.
#[derive(Args, Debug)]
pub struct VideoArgs {
    /// Text description of the video
    pub prompt: String,

    /// Elements to keep out of the video
    #[arg(long)]
    pub negative_prompt: Option<String>,

    /// Video width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 576)]
    pub height: u32,

    /// Video duration in seconds
    #[arg(long, default_value_t = 5)]
    pub duration: u32,

    /// Random seed for reproducible results
    #[arg(long)]
    pub seed: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init,
}

impl VideoArgs {
    pub fn to_request(&self) -> crate::ark::VideoJobRequest {
        let mut request = crate::ark::VideoJobRequest::new(&self.prompt);
        request.negative_prompt = self.negative_prompt.clone();
        request.width = self.width;
        request.height = self.height;
        request.duration_secs = self.duration;
        request.seed = self.seed;
        request
    }
}
