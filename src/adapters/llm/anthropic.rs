//! Anthropic API classifier implementation.
//!
//! Primary-path classifier that delegates the triage decision to the
//! Anthropic Messages API. The response is validated against a strict
//! result schema at this boundary; any shape violation, transport error,
//! or timeout surfaces as a classifier failure, which the engine recovers
//! from via the deterministic rule fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ClassifierConfig, Event, Severity, ToolCall, TriageOutput};
use crate::domain::ports::Classifier;

const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a manufacturing triage agent. Respond with ONLY a JSON \
object with keys: severity (one of S1, S2, S3, S4), category, rationale, and tools_to_call \
(a list of {name, args}). Available tools: stop_machine, schedule_maintenance, update_order, \
notify, log.";

/// Configuration for the Anthropic classifier.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (read from `ANTHROPIC_API_KEY` env if not set).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl AnthropicConfig {
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

impl From<&ClassifierConfig> for AnthropicConfig {
    fn from(c: &ClassifierConfig) -> Self {
        Self {
            api_key: None,
            base_url: c.base_url.clone(),
            model: c.model.clone(),
            timeout_secs: c.timeout_secs,
            max_tokens: c.max_tokens,
        }
    }
}

/// A message in the conversation.
#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Request to the Anthropic Messages API.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: &'static str,
    messages: Vec<Message>,
}

/// Content block in a response.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Response from the Anthropic Messages API.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// Untrusted triage shape returned by the model, before validation.
#[derive(Debug, Deserialize)]
struct RawTriage {
    severity: String,
    category: String,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    tools_to_call: Vec<RawToolCall>,
}

#[derive(Debug, Deserialize)]
struct RawToolCall {
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

/// Classifier backed by the Anthropic Messages API.
pub struct AnthropicClassifier {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClassifier {
    pub fn new(config: AnthropicConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Classifier(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn prompt(event: &Event) -> DomainResult<String> {
        Ok(format!("Event: {}", serde_json::to_string(event)?))
    }

    /// Validate and coerce the model's reply into a [`TriageOutput`].
    fn parse_triage(text: &str) -> DomainResult<TriageOutput> {
        let trimmed = strip_code_fences(text);
        let raw: RawTriage = serde_json::from_str(trimmed)
            .map_err(|e| DomainError::Classifier(format!("malformed triage reply: {e}")))?;

        let severity = Severity::from_str(&raw.severity)
            .ok_or_else(|| DomainError::Classifier(format!("invalid severity: {}", raw.severity)))?;
        if raw.category.trim().is_empty() {
            return Err(DomainError::Classifier("empty category".to_string()));
        }

        Ok(TriageOutput {
            severity,
            category: raw.category,
            rationale: raw.rationale,
            tools_to_call: raw
                .tools_to_call
                .into_iter()
                .map(|c| ToolCall::new(c.name, c.args))
                .collect(),
        })
    }
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    async fn classify(&self, event: &Event) -> DomainResult<TriageOutput> {
        let api_key = self
            .config
            .get_api_key()
            .ok_or_else(|| DomainError::Classifier("no API key configured".to_string()))?;

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: Self::prompt(event)?,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Classifier(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Classifier(format!("API error {status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Classifier(format!("malformed response: {e}")))?;

        let text = parsed
            .content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| DomainError::Classifier("no text content in response".to_string()))?;

        Self::parse_triage(text)
    }
}

/// Models occasionally wrap the JSON in a markdown fence despite the
/// instructions; accept that without weakening the schema check.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}
