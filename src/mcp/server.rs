//! MCP server implementation.

use super::protocol::*;
use super::tools::get_tools;
use crate::ark::{ImageRequest, VideoJobRequest};
use crate::config::Settings;
use crate::service::MediaService;
use futures::FutureExt;
use serde_json::{json, Value};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "skape";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for Skape.
pub struct McpServer {
    settings: Settings,
    service: Option<Arc<MediaService>>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            service: None,
        }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        // Log to stderr so it doesn't interfere with JSON-RPC
        eprintln!("Skape MCP server starting...");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    eprintln!("Failed to parse request: {}", e);
                    let response = JsonRpcResponse::error(None, -32700, "Parse error");
                    writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                    stdout.flush()?;
                    continue;
                }
            };

            let response = self.handle_request(request).await;
            writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
            stdout.flush()?;
        }

        Ok(())
    }

    /// Handle a single JSON-RPC request.
    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "initialized" => {
                // Notification, no response needed but we'll send empty success
                JsonRpcResponse::success(request.id, json!({}))
            }
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                -32601,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, id: Option<Value>) -> JsonRpcResponse {
        self.service = Some(Arc::new(MediaService::new(self.settings.clone())));
        eprintln!("Media service initialized");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult { tools: get_tools() };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    /// Handle tools/call request.
    async fn handle_tools_call(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, &format!("Invalid params: {}", e))
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        let result = match params.name.as_str() {
            "generate_image" => {
                guarded("generate_image", self.tool_generate_image(params.arguments)).await
            }
            "generate_video" => {
                guarded("generate_video", self.tool_create_video(params.arguments, true)).await
            }
            "create_video_task" => {
                guarded(
                    "create_video_task",
                    self.tool_create_video(params.arguments, false),
                )
                .await
            }
            "query_video_task" => {
                guarded("query_video_task", self.tool_query_video(params.arguments)).await
            }
            _ => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    /// Generate image tool.
    async fn tool_generate_image(&self, args: Option<Value>) -> ToolCallResult {
        let args = match args {
            Some(a) => a,
            None => return ToolCallResult::error("Missing arguments".to_string()),
        };

        let request = match parse_image_request(&args) {
            Ok(r) => r,
            Err(e) => return ToolCallResult::error(e),
        };

        let service = match &self.service {
            Some(s) => s,
            None => return ToolCallResult::error("Server not initialized".to_string()),
        };

        match service
            .generate_image(&request, &CancellationToken::new())
            .await
        {
            Ok(url) => ToolCallResult::text(format!(
                "Image generated.\nPrompt: {}\nSize: {}x{}\nURL: {}",
                request.prompt, request.width, request.height, url
            )),
            Err(e) => ToolCallResult::error(format!("Image generation failed: {}", e)),
        }
    }

    /// Video creation tools. `generate_video` and `create_video_task` share
    /// the same arguments; only the guidance text differs.
    async fn tool_create_video(&self, args: Option<Value>, with_guidance: bool) -> ToolCallResult {
        let args = match args {
            Some(a) => a,
            None => return ToolCallResult::error("Missing arguments".to_string()),
        };

        let request = match parse_video_request(&args) {
            Ok(r) => r,
            Err(e) => return ToolCallResult::error(e),
        };

        let service = match &self.service {
            Some(s) => s,
            None => return ToolCallResult::error("Server not initialized".to_string()),
        };

        match service
            .create_video_job(&request, &CancellationToken::new())
            .await
        {
            Ok(job_id) => {
                let mut text = format!(
                    "Video generation task created.\nPrompt: {}\nSize: {}x{}\nDuration: {}s\nTask ID: {}",
                    request.prompt, request.width, request.height, request.duration_secs, job_id
                );
                if with_guidance {
                    text.push_str(&format!(
                        "\n\nVideo generation usually takes 2-5 minutes. Query the \
                         result every 30 seconds or so with query_video_task, \
                         arguments: {{\"task_id\": \"{}\"}}",
                        job_id
                    ));
                }
                ToolCallResult::text(text)
            }
            Err(e) => ToolCallResult::error(format!("Failed to create video task: {}", e)),
        }
    }

    /// Query video task tool.
    async fn tool_query_video(&self, args: Option<Value>) -> ToolCallResult {
        let args = match args {
            Some(a) => a,
            None => return ToolCallResult::error("Missing arguments".to_string()),
        };

        let task_id = match args.get("task_id").and_then(|v| v.as_str()) {
            Some(id) if !id.is_empty() => id,
            _ => return ToolCallResult::error("Missing 'task_id' argument".to_string()),
        };

        let service = match &self.service {
            Some(s) => s,
            None => return ToolCallResult::error("Server not initialized".to_string()),
        };

        match service
            .query_video_job(task_id, &CancellationToken::new())
            .await
        {
            Ok(outcome) => ToolCallResult::text(outcome.describe(task_id)),
            Err(e) => ToolCallResult::error(format!("Failed to query task: {}", e)),
        }
    }
}

/// Boundary adapter around tool handlers: an unexpected panic becomes a
/// structured error result instead of taking the server down.
async fn guarded<F>(tool: &str, handler: F) -> ToolCallResult
where
    F: Future<Output = ToolCallResult>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(tool, %detail, "Tool handler panicked");
            ToolCallResult::error(format!("Internal error in tool {}: {}", tool, detail))
        }
    }
}

fn parse_image_request(args: &Value) -> std::result::Result<ImageRequest, String> {
    let prompt = args
        .get("prompt")
        .and_then(|v| v.as_str())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| "Missing 'prompt' argument".to_string())?;

    let mut request = ImageRequest::new(prompt);
    if let Some(width) = args.get("width").and_then(|v| v.as_u64()) {
        request.width = width as u32;
    }
    if let Some(height) = args.get("height").and_then(|v| v.as_u64()) {
        request.height = height as u32;
    }
    request.seed = args.get("seed").and_then(|v| v.as_i64());
    request.watermark = args.get("watermark").and_then(|v| v.as_bool());
    Ok(request)
}

fn parse_video_request(args: &Value) -> std::result::Result<VideoJobRequest, String> {
    let prompt = args
        .get("prompt")
        .and_then(|v| v.as_str())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| "Missing 'prompt' argument".to_string())?;

    let mut request = VideoJobRequest::new(prompt);
    request.negative_prompt = args
        .get("negative_prompt")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    if let Some(width) = args.get("width").and_then(|v| v.as_u64()) {
        request.width = width as u32;
    }
    if let Some(height) = args.get("height").and_then(|v| v.as_u64()) {
        request.height = height as u32;
    }
    if let Some(duration) = args.get("duration").and_then(|v| v.as_u64()) {
        request.duration_secs = duration as u32;
    }
    request.seed = args.get("seed").and_then(|v| v.as_i64());
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_args_fall_back_to_defaults() {
        let request = parse_video_request(&json!({"prompt": "sunset over mountains"})).unwrap();
        assert_eq!(request.width, 1024);
        assert_eq!(request.height, 576);
        assert_eq!(request.duration_secs, 5);
        assert_eq!(request.seed, None);

        let request = parse_video_request(
            &json!({"prompt": "p", "width": 1280, "height": 720, "duration": 10, "seed": 3}),
        )
        .unwrap();
        assert_eq!((request.width, request.height), (1280, 720));
        assert_eq!(request.duration_secs, 10);
        assert_eq!(request.seed, Some(3));
    }

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(parse_video_request(&json!({"prompt": ""})).is_err());
        assert!(parse_image_request(&json!({})).is_err());
    }

    #[test]
    fn image_args_fall_back_to_defaults() {
        let request = parse_image_request(&json!({"prompt": "a red fox"})).unwrap();
        assert_eq!((request.width, request.height), (1024, 1024));
        assert_eq!(request.watermark, None);
    }

    #[tokio::test]
    async fn panicking_handler_becomes_structured_error() {
        let result = guarded("generate_image", async {
            panic!("handler blew up");
        })
        .await;
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["isError"], true);
        let text = value["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("generate_image"));
        assert!(text.contains("handler blew up"));
    }

    #[tokio::test]
    async fn tools_list_and_unknown_method() {
        let mut server = McpServer::new(Settings::default());

        let response = server
            .handle_request(JsonRpcRequest {
                jsonrpc: "2.0".to_string(),
                id: Some(json!(1)),
                method: "tools/list".to_string(),
                params: None,
            })
            .await;
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["result"]["tools"].as_array().unwrap().len(), 4);

        let response = server
            .handle_request(JsonRpcRequest {
                jsonrpc: "2.0".to_string(),
                id: Some(json!(2)),
                method: "resources/list".to_string(),
                params: None,
            })
            .await;
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn call_before_initialize_is_a_tool_error() {
        let server = McpServer::new(Settings::default());
        let result = server
            .tool_query_video(Some(json!({"task_id": "cgt-1"})))
            .await;
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["isError"], true);
    }
}
