use crate::cli::{Cli, DEFAULT_OPENAI_BASE_URL, DEFAULT_STABILITY_URL};
use crate::error::{CodeBeastError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const LANGFLOW_TIMEOUT: Duration = Duration::from_secs(120);
pub const DALL_E_TIMEOUT: Duration = Duration::from_secs(60);
pub const STABILITY_TIMEOUT: Duration = Duration::from_secs(45);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Langflow connection settings
#[derive(Debug, Clone)]
pub struct LangflowConfig {
    pub base_url: Url,
    pub flow_id: String,
    pub api_key: Option<String>,
}

/// Read-only process configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub langflow: LangflowConfig,
    pub openai_api_key: String,
    pub openai_base_url: Url,
    pub stability_api_key: Option<String>,
    pub stability_url: Url,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Minimal configuration pointing at the given upstreams, mostly for tests
    pub fn new(langflow_base_url: Url, flow_id: impl Into<String>, openai_api_key: impl Into<String>) -> Result<Self> {
        let openai_base_url = Url::parse(DEFAULT_OPENAI_BASE_URL)
            .map_err(|e| CodeBeastError::Config(format!("Invalid OpenAI URL: {}", e)))?;
        let stability_url = Url::parse(DEFAULT_STABILITY_URL)
            .map_err(|e| CodeBeastError::Config(format!("Invalid Stability URL: {}", e)))?;

        let config = AppConfig {
            langflow: LangflowConfig {
                base_url: langflow_base_url,
                flow_id: flow_id.into(),
                api_key: None,
            },
            openai_api_key: openai_api_key.into(),
            openai_base_url,
            stability_api_key: None,
            stability_url,
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.langflow.flow_id.trim().is_empty() {
            return Err(CodeBeastError::Config("LANGFLOW_FLOW_ID must not be empty".to_string()));
        }
        if self.openai_api_key.trim().is_empty() {
            return Err(CodeBeastError::Config("OPENAI_API_KEY must not be empty".to_string()));
        }
        Ok(())
    }

    /// Directory generated images are written to and served from
    pub fn temp_dir(&self) -> PathBuf {
        self.static_dir.join("temp")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TryFrom<Cli> for AppConfig {
    type Error = CodeBeastError;

    fn try_from(cli: Cli) -> Result<Self> {
        // Empty env values count as unset
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let config = AppConfig {
            langflow: LangflowConfig {
                base_url: cli.langflow_base_url,
                flow_id: cli.langflow_flow_id,
                api_key: non_empty(cli.langflow_api_key),
            },
            openai_api_key: cli.openai_api_key,
            openai_base_url: cli.openai_base_url,
            stability_api_key: non_empty(cli.stability_api_key),
            stability_url: cli.stability_url,
            host: cli.host,
            port: cli.port,
            static_dir: cli.static_dir,
        };
        config.validate()?;
        Ok(config)
    }
}
