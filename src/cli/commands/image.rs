//! Image command implementation.

use crate::ark::ImageRequest;
use crate::cli::Output;
use crate::config::Settings;
use crate::service::MediaService;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Run the image command.
pub async fn run_image(
    prompt: &str,
    width: u32,
    height: u32,
    seed: Option<i64>,
    watermark: bool,
    settings: Settings,
) -> Result<()> {
    let service = MediaService::new(settings);

    let mut request = ImageRequest::new(prompt);
    request.width = width;
    request.height = height;
    request.seed = seed;
    request.watermark = Some(watermark);

    let spinner = Output::spinner("Generating image...");

    match service.generate_image(&request, &CancellationToken::new()).await {
        Ok(url) => {
            spinner.finish_and_clear();
            Output::success("Image generated");
            Output::kv("Prompt", prompt);
            Output::kv("Size", &format!("{}x{}", width, height));
            Output::kv("URL", &url);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Image generation failed: {}", e));
            Err(e.into())
        }
    }
}
