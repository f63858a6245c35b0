use clap::Parser;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STABILITY_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/sd3";

#[derive(Parser, Debug, Clone)]
#[command(name = "codebeast-server")]
#[command(about = "CodeBeast Generator API - Turns GitHub profiles into pixel art mascots")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Langflow base URL
    #[arg(long, env = "LANGFLOW_BASE_URL")]
    pub langflow_base_url: Url,

    /// Langflow flow identifier
    #[arg(long, env = "LANGFLOW_FLOW_ID")]
    pub langflow_flow_id: String,

    /// Langflow API key, sent as x-api-key
    #[arg(long, env = "LANGFLOW_API_KEY", hide_env_values = true)]
    pub langflow_api_key: Option<String>,

    /// OpenAI API key used for DALL-E
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: Url,

    /// Stability AI API key; the stability model is unavailable without it
    #[arg(long, env = "STABILITY_API_KEY", hide_env_values = true)]
    pub stability_api_key: Option<String>,

    /// Stability AI generation endpoint
    #[arg(long, env = "STABILITY_URL", default_value = DEFAULT_STABILITY_URL)]
    pub stability_url: Url,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory holding the frontend build and the temp image folder
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,
}
