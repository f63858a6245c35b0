use super::{decode_image, GeneratedImage, ImageGenerator};
use crate::config::STABILITY_TIMEOUT;
use crate::error::{CodeBeastError, Result};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};
use url::Url;

/// Header Stability sets when the NSFW classifier blocked the output
pub const FINISH_REASON_HEADER: &str = "finish-reason";
pub const CONTENT_FILTERED: &str = "CONTENT_FILTERED";

const STYLE_SUFFIX: &str = "A very cute animal in detailed pixel art style, \
with large expressive eyes looking directly at the viewer, \
a playful and adorable expression, \
vibrant colors, and a nostalgic retro 8-bit or 16-bit video game aesthetic. \
The image should have pixel shading, colorful lighting, and soft dithering for a polished effect.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Webp => write!(f, "webp"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StabilityOptions {
    pub negative_prompt: String,
    pub aspect_ratio: String,
    pub seed: u32,
    pub output_format: OutputFormat,
    pub model: String,
    pub size: u32,
    /// Produce a pixelated variant with blocks of this many pixels
    pub pixel_size: Option<u32>,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        StabilityOptions {
            negative_prompt: String::new(),
            aspect_ratio: "1:1".to_string(),
            seed: 0,
            output_format: OutputFormat::Png,
            model: "sd3-large-turbo".to_string(),
            size: 512,
            pixel_size: None,
        }
    }
}

pub fn build_prompt(prompt: &str) -> String {
    format!("{}. {}", prompt.trim(), STYLE_SUFFIX)
}

pub struct StabilityGenerator {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl StabilityGenerator {
    pub fn new(api_key: String, endpoint: &Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("CodeBeast Server/", env!("CARGO_PKG_VERSION")))
            .timeout(STABILITY_TIMEOUT)
            .build()?;

        info!("Initialized Stability generator with endpoint: {}", endpoint);
        Ok(StabilityGenerator {
            client,
            api_key,
            endpoint: endpoint.clone(),
        })
    }
}

#[async_trait]
impl ImageGenerator for StabilityGenerator {
    type Options = StabilityOptions;

    async fn generate(&self, prompt: &str, options: &StabilityOptions) -> Result<GeneratedImage> {
        if options.pixel_size == Some(0) {
            return Err(CodeBeastError::InvalidInput("pixel_size must be at least 1".to_string()));
        }

        let full_prompt = build_prompt(prompt);
        debug!("Processing prompt: {}", full_prompt);

        let form = Form::new()
            .text("prompt", full_prompt)
            .text("negative_prompt", options.negative_prompt.clone())
            .text("aspect_ratio", options.aspect_ratio.clone())
            .text("seed", options.seed.to_string())
            .text("output_format", options.output_format.to_string())
            .text("size", options.size.to_string())
            .text("model", options.model.clone());

        info!("Sending request to Stability API...");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "image/*")
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("API connection error: {}", e);
                CodeBeastError::Connection(format!("Failed to connect to Stability API: {}", e))
            })?;

        let status = response.status();
        debug!("Response status code: {}", status);

        let filtered = response
            .headers()
            .get(FINISH_REASON_HEADER)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|reason| reason.eq_ignore_ascii_case(CONTENT_FILTERED));
        if filtered {
            warn!("Content filtered by NSFW classifier");
            return Err(CodeBeastError::InvalidInput(
                "NSFW content detected. Please try a different prompt.".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error response: {}", body);
            return Err(CodeBeastError::Connection(format!(
                "Stability API request failed with status {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            CodeBeastError::Connection(format!("Failed to read Stability response: {}", e))
        })?;
        info!("Successfully received image from API");

        let generated = decode_image(bytes.to_vec(), options.pixel_size).await?;
        let image = &generated.image;
        debug!("Image size: {}x{}, color: {:?}", image.width(), image.height(), image.color());

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = StabilityOptions::default();
        assert_eq!(options.aspect_ratio, "1:1");
        assert_eq!(options.model, "sd3-large-turbo");
        assert_eq!(options.size, 512);
        assert_eq!(options.output_format.to_string(), "png");
        assert!(options.pixel_size.is_none());
    }

    #[test]
    fn test_build_prompt_appends_style() {
        let prompt = build_prompt("an owl that writes Haskell ");
        assert!(prompt.starts_with("an owl that writes Haskell. A very cute animal"));
        assert!(prompt.ends_with("for a polished effect."));
    }
}
