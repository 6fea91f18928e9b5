// OpenAI-compatible classification oracle client

use std::time::Duration;

use log::warn;
use serde::Deserialize;
use serde_json::{json, Value};

use memberdb_commons::{AppError, AppResult};

use crate::classify::{ClassificationOracle, GroupedLabels};

/// Connection settings for the completion endpoint. `base_url` points at an
/// OpenAI-compatible API root (the `/chat/completions` suffix is appended
/// here).
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

/// Chat-completion-backed oracle. Decoding is pinned to temperature 0 and
/// the response is constrained by a strict JSON schema, so the reply parses
/// directly into [`GroupedLabels`].
pub struct CompletionOracle {
    http: reqwest::Client,
    config: OracleConfig,
}

impl CompletionOracle {
    pub fn new(config: OracleConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl ClassificationOracle for CompletionOracle {
    async fn classify(&self, prompt: &str) -> AppResult<GroupedLabels> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&completion_request(&self.config.model, prompt))
            .send()
            .await
            .map_err(|e| AppError::Classification(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("oracle returned {status}");
            return Err(AppError::Classification(format!(
                "oracle returned status {status}"
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Classification(format!("unreadable response: {e}")))?;
        parse_completion(body)
    }
}

/// Request body for one classification call. The response format mirrors
/// the service's long-standing contract: an object whose keys are class
/// labels and whose values are arrays of matching sample strings.
fn completion_request(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "temperature": 0,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "classification_result",
                "schema": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "array",
                        "items": {"type": "string"}
                    },
                    "description": "Grouped classification result where keys are the classes."
                },
                "strict": true
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

fn parse_completion(body: CompletionResponse) -> AppResult<GroupedLabels> {
    let content = body
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .ok_or_else(|| AppError::Classification("empty completion".to_string()))?;

    serde_json::from_str(content)
        .map_err(|e| AppError::Classification(format!("malformed grouping: {e}")))
}
