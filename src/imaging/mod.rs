//! Image generation through DALL-E or Stability AI.

pub mod dall_e;
pub mod stability;

pub use dall_e::{DallEGenerator, DallEOptions, DallESize};
pub use stability::{OutputFormat, StabilityGenerator, StabilityOptions, CONTENT_FILTERED};

use crate::config::AppConfig;
use crate::error::{CodeBeastError, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image returned by a provider, with the optional pixelated variant
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image: DynamicImage,
    pub pixelated: Option<DynamicImage>,
}

impl GeneratedImage {
    pub fn new(image: DynamicImage) -> Self {
        GeneratedImage {
            image,
            pixelated: None,
        }
    }
}

/// A remote image generation backend
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    type Options: Default + Send + Sync;

    /// Generate an image for `prompt`.
    ///
    /// Transport failures surface as [`CodeBeastError::Connection`], anything
    /// else unexpected as [`CodeBeastError::Runtime`].
    async fn generate(&self, prompt: &str, options: &Self::Options) -> Result<GeneratedImage>;
}

/// Provider requested by the client. Unknown names fall back to DALL-E.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderKind {
    #[default]
    DallE,
    Stability,
}

impl From<String> for ProviderKind {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "stability" => ProviderKind::Stability,
            _ => ProviderKind::DallE,
        }
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::DallE => write!(f, "dall_e"),
            ProviderKind::Stability => write!(f, "stability"),
        }
    }
}

/// Per-request knobs that apply to one provider or the other
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub size: Option<DallESize>,
    pub pixel_size: Option<u32>,
}

/// A provider selected for one request
#[derive(Clone, Copy)]
pub enum ImageProvider<'a> {
    DallE(&'a DallEGenerator),
    Stability(&'a StabilityGenerator),
}

impl ImageProvider<'_> {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ImageProvider::DallE(_) => ProviderKind::DallE,
            ImageProvider::Stability(_) => ProviderKind::Stability,
        }
    }

    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GeneratedImage> {
        match self {
            ImageProvider::DallE(generator) => {
                let options = DallEOptions {
                    size: params.size.unwrap_or_default(),
                };
                generator.generate(prompt, &options).await
            }
            ImageProvider::Stability(generator) => {
                let options = StabilityOptions {
                    pixel_size: params.pixel_size,
                    ..Default::default()
                };
                generator.generate(prompt, &options).await
            }
        }
    }
}

/// The configured generators
pub struct ImageGenerators {
    dall_e: DallEGenerator,
    stability: Option<StabilityGenerator>,
}

impl ImageGenerators {
    pub fn new(dall_e: DallEGenerator, stability: Option<StabilityGenerator>) -> Self {
        ImageGenerators { dall_e, stability }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dall_e = DallEGenerator::new(config.openai_api_key.clone(), &config.openai_base_url)?;
        let stability = config
            .stability_api_key
            .clone()
            .map(|key| StabilityGenerator::new(key, &config.stability_url))
            .transpose()?;
        Ok(ImageGenerators::new(dall_e, stability))
    }

    pub fn provider(&self, kind: ProviderKind) -> Result<ImageProvider<'_>> {
        match kind {
            ProviderKind::DallE => Ok(ImageProvider::DallE(&self.dall_e)),
            ProviderKind::Stability => self
                .stability
                .as_ref()
                .map(ImageProvider::Stability)
                .ok_or_else(|| {
                    CodeBeastError::InvalidInput("The stability model is not configured on this server".to_string())
                }),
        }
    }

    pub fn available(&self) -> Vec<ProviderKind> {
        let mut kinds = vec![ProviderKind::DallE];
        if self.stability.is_some() {
            kinds.push(ProviderKind::Stability);
        }
        kinds
    }
}

/// Blocky version of `image`: shrink by `pixel_size`, then scale back up,
/// both with nearest-neighbor sampling.
pub fn pixelate(image: &DynamicImage, pixel_size: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let factor = pixel_size.max(1);
    let small = image.resize_exact(
        (width / factor).max(1),
        (height / factor).max(1),
        FilterType::Nearest,
    );
    small.resize_exact(width, height, FilterType::Nearest)
}

/// Decode provider bytes on the blocking pool, pixelating when asked
pub(crate) async fn decode_image(bytes: Vec<u8>, pixel_size: Option<u32>) -> Result<GeneratedImage> {
    tokio::task::spawn_blocking(move || -> Result<GeneratedImage> {
        let image = image::load_from_memory(&bytes)
            .map_err(|e| CodeBeastError::Runtime(format!("Error decoding generated image: {}", e)))?;
        let pixelated = pixel_size.map(|pixel_size| pixelate(&image, pixel_size));
        Ok(GeneratedImage { image, pixelated })
    })
    .await
    .map_err(|e| CodeBeastError::Runtime(format!("Image decoding task failed: {}", e)))?
}
