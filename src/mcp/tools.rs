//! MCP tool definitions for Skape.

use super::protocol::Tool;
use serde_json::json;

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "generate_image".to_string(),
            description: "Generate an image from a text description. \
                Synchronous: returns the image URL when generation finishes."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Text description of the image"
                    },
                    "width": {
                        "type": "integer",
                        "description": "Image width in pixels",
                        "default": 1024
                    },
                    "height": {
                        "type": "integer",
                        "description": "Image height in pixels",
                        "default": 1024
                    },
                    "seed": {
                        "type": "integer",
                        "description": "Random seed for reproducible results"
                    },
                    "watermark": {
                        "type": "boolean",
                        "description": "Add a watermark to the image",
                        "default": false
                    }
                },
                "required": ["prompt"]
            }),
        },
        Tool {
            name: "generate_video".to_string(),
            description: "Start video generation from a text description. \
                Creates a remote job and returns its task ID immediately; poll the \
                result with query_video_task. Does not wait for completion, so the \
                call never times out."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Text description of the video"
                    },
                    "negative_prompt": {
                        "type": "string",
                        "description": "Elements to keep out of the video"
                    },
                    "width": {
                        "type": "integer",
                        "description": "Video width in pixels",
                        "default": 1024
                    },
                    "height": {
                        "type": "integer",
                        "description": "Video height in pixels",
                        "default": 576
                    },
                    "duration": {
                        "type": "integer",
                        "description": "Video duration in seconds",
                        "default": 5
                    },
                    "seed": {
                        "type": "integer",
                        "description": "Random seed for reproducible results"
                    }
                },
                "required": ["prompt"]
            }),
        },
        Tool {
            name: "create_video_task".to_string(),
            description: "Create a video generation task and return its task ID \
                without waiting for completion. Same arguments as generate_video."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Text description of the video"
                    },
                    "negative_prompt": {
                        "type": "string",
                        "description": "Elements to keep out of the video"
                    },
                    "width": {
                        "type": "integer",
                        "description": "Video width in pixels",
                        "default": 1024
                    },
                    "height": {
                        "type": "integer",
                        "description": "Video height in pixels",
                        "default": 576
                    },
                    "duration": {
                        "type": "integer",
                        "description": "Video duration in seconds",
                        "default": 5
                    },
                    "seed": {
                        "type": "integer",
                        "description": "Random seed for reproducible results"
                    }
                },
                "required": ["prompt"]
            }),
        },
        Tool {
            name: "query_video_task".to_string(),
            description: "Query the status of a video generation task. Reports \
                progress, the finished video URL, or a throttle notice when queried \
                more often than once per 15 seconds."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "string",
                        "description": "The task ID returned by generate_video or create_video_task"
                    }
                },
                "required": ["task_id"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_four_tools_are_listed() {
        let tools = get_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "generate_image",
                "generate_video",
                "create_video_task",
                "query_video_task"
            ]
        );
    }

    #[test]
    fn schemas_declare_required_fields() {
        for tool in get_tools() {
            let required = tool.input_schema["required"].as_array().unwrap();
            assert!(!required.is_empty(), "{} has no required fields", tool.name);
        }
    }
}
