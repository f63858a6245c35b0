use crate::imaging::{DallESize, ProviderKind};
use serde::{Deserialize, Serialize};

/// One candidate mascot animal and why it was picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct AnimalChoice {
    pub name: String,
    pub description: String,
}

impl AnimalChoice {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        AnimalChoice {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<(String, String)> for AnimalChoice {
    fn from((name, description): (String, String)) -> Self {
        AnimalChoice { name, description }
    }
}

impl From<AnimalChoice> for (String, String) {
    fn from(choice: AnimalChoice) -> Self {
        (choice.name, choice.description)
    }
}

/// Structured record extracted from the Langflow text reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProfile {
    pub languages: Vec<String>,
    pub prompt: String,
    pub profile_url: String,
    pub repository_count: u32,
    pub animal_selection: Vec<AnimalChoice>,
}

/// Body of `POST /chat/process`
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub response: String,
    pub languages: Vec<String>,
    pub github_url: String,
    pub num_repositories: u32,
    pub animal_selection: Vec<AnimalChoice>,
    pub status: String,
}

impl From<ParsedProfile> for ProcessResponse {
    fn from(profile: ParsedProfile) -> Self {
        ProcessResponse {
            response: profile.prompt,
            languages: profile.languages,
            github_url: profile.profile_url,
            num_repositories: profile.repository_count,
            animal_selection: profile.animal_selection,
            status: "success".to_string(),
        }
    }
}

/// Body of `POST /chat/generate-image`
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: ProviderKind,
    pub handle: Option<String>,
    /// DALL-E only
    pub size: Option<DallESize>,
    /// Stability only; enables the pixelated variant
    pub pixel_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixelated_url: Option<String>,
    pub status: String,
}

/// A generated image available in the temp directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    pub username: String,
    pub image_url: String,
}

/// Error body shared by all handlers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            status: "error".to_string(),
        }
    }
}
