use crate::config::{LangflowConfig, LANGFLOW_TIMEOUT};
use crate::error::Result;
use crate::models::ParsedProfile;
use crate::parser::parse_profile;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize)]
struct RunFlowRequest<'a> {
    input_value: &'a str,
    output_type: &'a str,
    input_type: &'a str,
    session_id: String,
}

/// Client for the Langflow run API
pub struct LangflowClient {
    client: Client,
    run_url: String,
    api_key: Option<String>,
}

impl LangflowClient {
    pub fn new(config: &LangflowConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("CodeBeast Server/", env!("CARGO_PKG_VERSION")))
            .timeout(LANGFLOW_TIMEOUT)
            .build()?;

        let run_url = format!(
            "{}/api/v1/run/{}",
            config.base_url.as_str().trim_end_matches('/'),
            config.flow_id
        );

        Ok(LangflowClient {
            client,
            run_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Run the flow for a GitHub handle and parse its reply
    pub async fn run_flow(&self, handle: &str) -> Result<ParsedProfile> {
        let text = self.run_flow_raw(handle).await?;
        Ok(parse_profile(&text))
    }

    /// Run the flow and return the reply text without parsing it
    pub async fn run_flow_raw(&self, handle: &str) -> Result<String> {
        let payload = RunFlowRequest {
            input_value: handle,
            output_type: "chat",
            input_type: "chat",
            session_id: handle.to_lowercase(),
        };

        let mut request = self.client.post(&self.run_url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        info!("Running Langflow flow for {}", handle);
        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                error!("Error calling Langflow API: {}", e);
                e
            })?;

        let body: Value = response.json().await?;
        let text = match extract_message(&body) {
            Some(text) => text.to_string(),
            None => {
                warn!("Langflow response did not contain a message, using defaults");
                String::new()
            }
        };
        debug!("Raw Langflow response: {}", text);
        Ok(text)
    }
}

/// Locate the chat message inside a run response
pub fn extract_message(body: &Value) -> Option<&str> {
    let output = body.pointer("/outputs/0/outputs/0")?;
    output
        .pointer("/results/message/text")
        .and_then(Value::as_str)
        .or_else(|| output.pointer("/messages/0/message").and_then(Value::as_str))
}
