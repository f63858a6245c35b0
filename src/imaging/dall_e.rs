use super::{decode_image, GeneratedImage, ImageGenerator};
use crate::config::{DALL_E_TIMEOUT, DOWNLOAD_TIMEOUT};
use crate::error::{CodeBeastError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info};
use url::Url;

const MODEL: &str = "dall-e-3";

const STYLE_PREAMBLE: &str = "A very cute animal in detailed pixel art style, focus on the animal's face \
with large expressive eyes looking directly at the viewer, a playful and adorable expression, \
vibrant colors, and a nostalgic retro 8-bit or 16-bit video game aesthetic. \
The image should have pixel shading, colorful lighting, and soft dithering for a polished effect";

const NEGATIVE_PROMPT: &str = "avoid any text in the image, \
avoid any objects that are not animals, \
avoid any animals in the background, \
do not draw color palettes or color swatches";

/// Output sizes accepted by DALL-E 3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DallESize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    Portrait,
}

impl DallESize {
    pub fn as_str(&self) -> &'static str {
        match self {
            DallESize::Square => "1024x1024",
            DallESize::Landscape => "1792x1024",
            DallESize::Portrait => "1024x1792",
        }
    }
}

impl fmt::Display for DallESize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DallEOptions {
    pub size: DallESize,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: DallESize,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GenerationData>,
}

#[derive(Debug, Deserialize)]
struct GenerationData {
    url: Option<String>,
}

/// Wrap the mascot description with the fixed pixel-art style and exclusions
pub fn build_prompt(prompt: &str) -> String {
    format!("{}, {}, {}", STYLE_PREAMBLE, prompt.trim(), NEGATIVE_PROMPT)
}

pub struct DallEGenerator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl DallEGenerator {
    /// `base_url` is the OpenAI API root, e.g. `https://api.openai.com/v1`
    pub fn new(api_key: String, base_url: &Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("CodeBeast Server/", env!("CARGO_PKG_VERSION")))
            .timeout(DALL_E_TIMEOUT)
            .build()?;
        let endpoint = format!("{}/images/generations", base_url.as_str().trim_end_matches('/'));

        info!("Initialized DALL-E generator with endpoint: {}", endpoint);
        Ok(DallEGenerator {
            client,
            api_key,
            endpoint,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading image from URL: {}", url);
        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                error!("Image download error: {}", e);
                CodeBeastError::Connection(format!("Failed to download generated image: {}", e))
            })?;

        let bytes = response.bytes().await.map_err(|e| {
            CodeBeastError::Connection(format!("Failed to download generated image: {}", e))
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for DallEGenerator {
    type Options = DallEOptions;

    async fn generate(&self, prompt: &str, options: &DallEOptions) -> Result<GeneratedImage> {
        let full_prompt = build_prompt(prompt);
        debug!("Processing prompt: {}", full_prompt);
        info!("Sending request to DALL-E API with size: {}", options.size);

        let request = GenerationRequest {
            model: MODEL,
            prompt: &full_prompt,
            n: 1,
            size: options.size,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("DALL-E API error: {}", e);
                CodeBeastError::Connection(format!("Failed to generate image with DALL-E: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("DALL-E API returned {}: {}", status, body);
            return Err(CodeBeastError::Connection(format!(
                "DALL-E API request failed with status {}: {}",
                status, body
            )));
        }

        let payload: GenerationResponse = response
            .json()
            .await
            .map_err(|e| CodeBeastError::Runtime(format!("Unexpected DALL-E response: {}", e)))?;

        let image_url = payload
            .data
            .into_iter()
            .find_map(|data| data.url)
            .ok_or_else(|| CodeBeastError::Runtime("DALL-E response did not include an image URL".to_string()))?;
        info!("Successfully received image URL from API");

        let bytes = self.download(&image_url).await?;
        decode_image(bytes, None).await
    }
}
