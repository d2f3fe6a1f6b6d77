//! Remote job client for the Ark generative-media API.

mod client;
mod types;

pub use client::{ArkClient, VideoJobApi};
pub use types::{
    ImageRequest, JobSnapshot, VideoJobRequest, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
    DEFAULT_VIDEO_DURATION_SECS, DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH,
};
