//! Request and response types for the Ark generative-media API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Default image dimensions.
pub const DEFAULT_IMAGE_WIDTH: u32 = 1024;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 1024;

/// Default video dimensions and duration.
pub const DEFAULT_VIDEO_WIDTH: u32 = 1024;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 576;
pub const DEFAULT_VIDEO_DURATION_SECS: u32 = 5;

/// A synchronous image generation request.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub seed: Option<i64>,
    pub watermark: Option<bool>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
            seed: None,
            watermark: None,
        }
    }

    /// Serialize into the Ark `/images/generations` request body.
    pub(crate) fn to_body(&self, model: &str) -> Value {
        let mut body = json!({
            "model": model,
            "prompt": self.prompt,
            "n": 1,
            "size": format!("{}x{}", self.width, self.height),
            "response_format": "url",
            "watermark": self.watermark.unwrap_or(false),
        });
        if let Some(seed) = self.seed {
            body["seed"] = json!(seed);
        }
        body
    }
}

/// A long-running video generation request. Immutable once submitted.
#[derive(Debug, Clone)]
pub struct VideoJobRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    pub duration_secs: u32,
    pub seed: Option<i64>,
    /// Extra generation parameters merged into the `parameters` object.
    pub extra: Option<Map<String, Value>>,
}

impl VideoJobRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
            duration_secs: DEFAULT_VIDEO_DURATION_SECS,
            seed: None,
            extra: None,
        }
    }

    /// Serialize into the Ark `/contents/generations/tasks` request body.
    pub(crate) fn to_body(&self, model: &str) -> Value {
        let mut parameters = Map::new();
        parameters.insert("width".into(), json!(self.width));
        parameters.insert("height".into(), json!(self.height));
        parameters.insert("duration".into(), json!(self.duration_secs));
        if let Some(seed) = self.seed {
            parameters.insert("seed".into(), json!(seed));
        }
        if let Some(extra) = &self.extra {
            for (k, v) in extra {
                parameters.insert(k.clone(), v.clone());
            }
        }

        let mut body = json!({
            "model": model,
            "content": [{ "type": "text", "text": self.prompt }],
            "parameters": parameters,
        });
        if let Some(neg) = &self.negative_prompt {
            if !neg.is_empty() {
                body["negative_prompt"] = json!(neg);
            }
        }
        body
    }
}

/// The result of one status query for a video job, as reported by the remote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub id: String,
    /// Raw remote status string, surfaced verbatim.
    pub status: String,
    /// Creation time in epoch seconds, when reported.
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub video_url: Option<String>,
    pub resolution: Option<String>,
    pub ratio: Option<String>,
    pub duration_secs: Option<i64>,
    pub fps: Option<i64>,
    pub seed: Option<i64>,
}

// Wire-format response bodies.

#[derive(Debug, Deserialize)]
pub(crate) struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageDatum {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateJobResponse {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryJobResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub content: JobContent,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub resolution: Option<String>,
    pub ratio: Option<String>,
    pub duration: Option<i64>,
    #[serde(rename = "framespersecond")]
    pub frames_per_second: Option<i64>,
    pub seed: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobContent {
    #[serde(default)]
    pub video_url: String,
}

impl QueryJobResponse {
    pub(crate) fn into_snapshot(self, handle: &str) -> JobSnapshot {
        JobSnapshot {
            // Some responses omit the id; fall back to the queried handle.
            id: if self.id.is_empty() {
                handle.to_string()
            } else {
                self.id
            },
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            video_url: if self.content.video_url.is_empty() {
                None
            } else {
                Some(self.content.video_url)
            },
            resolution: self.resolution,
            ratio: self.ratio,
            duration_secs: self.duration,
            fps: self.frames_per_second,
            seed: self.seed,
        }
    }
}
