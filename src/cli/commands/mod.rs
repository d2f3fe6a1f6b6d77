//! CLI command implementations.

mod config;
mod doctor;
mod image;
mod mcp;
mod serve;
mod video;

pub use config::run_config;
pub use doctor::run_doctor;
pub use image::run_image;
pub use mcp::run_mcp;
pub use serve::run_serve;
pub use video::{run_video_create, run_video_query, run_video_wait};
