// ABOUTME: OpenAI-compatible LLM provider for hosted OpenAI and local endpoints
// ABOUTME: Implements free-text and JSON-schema constrained chat completions over reqwest
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Generic implementation for any endpoint that speaks the `OpenAI` chat
//! completions API: hosted `OpenAI`, Ollama, vLLM, `LocalAI`.
//!
//! ## Configuration
//!
//! - `MISE_LLM_BASE_URL`: Base URL (default: <https://api.openai.com/v1>)
//! - `MISE_LLM_MODEL`: Model to use (default: `gpt-4o-mini`)
//! - `MISE_LLM_API_KEY` or `OPENAI_API_KEY`: API key (required for hosted `OpenAI`)
//!
//! ## Structured output
//!
//! When the endpoint supports it, structured calls send
//! `response_format: {"type": "json_schema"}`. Endpoints with only JSON mode get
//! `json_object` plus the schema written into the system prompt; endpoints with
//! neither get the prompt instructions alone. Replies are then parsed leniently
//! (code fences and surrounding prose are stripped).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmCapabilities, LlmProvider,
    MessageRole, OutputSchema, TokenUsage,
};
use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, ErrorCode};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Transport-level request timeout; the assistant applies its own tighter budget
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Service label used in error messages
const SERVICE_LABEL: &str = "LLM";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
    stream: bool,
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

/// OpenAI-compatible API response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Usage statistics in response
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// How a structured call asks the endpoint for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StructuredMode {
    JsonSchema,
    JsonObject,
    PromptOnly,
}

impl StructuredMode {
    const fn for_capabilities(capabilities: LlmCapabilities) -> Self {
        if capabilities.supports_structured_output() {
            Self::JsonSchema
        } else if capabilities.supports_json_mode() {
            Self::JsonObject
        } else {
            Self::PromptOnly
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Provider name for logging
    pub provider_name: String,
    /// Capabilities of this endpoint
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Configuration for hosted `OpenAI`
    #[must_use]
    pub fn openai(api_key: impl Into<String>, model: &str) -> Self {
        Self {
            base_url: defaults::LLM_BASE_URL.to_owned(),
            api_key: Some(api_key.into()),
            default_model: model.to_owned(),
            provider_name: "openai".to_owned(),
            capabilities: LlmCapabilities::full_featured(),
        }
    }

    /// Configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            provider_name: "ollama".to_owned(),
            capabilities: LlmCapabilities::SYSTEM_MESSAGES | LlmCapabilities::JSON_MODE,
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if hosted `OpenAI` is targeted without an API key, or
    /// if the HTTP client cannot be created.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url =
            env::var(env_vars::LLM_BASE_URL).unwrap_or_else(|_| defaults::LLM_BASE_URL.to_owned());
        let default_model =
            env::var(env_vars::LLM_MODEL).unwrap_or_else(|_| defaults::LLM_MODEL.to_owned());
        let api_key = env::var(env_vars::LLM_API_KEY)
            .or_else(|_| env::var(env_vars::OPENAI_API_KEY))
            .ok()
            .filter(|k| !k.is_empty());

        let is_hosted_openai = base_url.contains("api.openai.com");
        if is_hosted_openai && api_key.is_none() {
            return Err(AppError::config(format!(
                "Missing {} (or {}) environment variable for {base_url}",
                env_vars::LLM_API_KEY,
                env_vars::OPENAI_API_KEY
            )));
        }

        let (provider_name, capabilities) = if is_hosted_openai {
            ("openai", LlmCapabilities::full_featured())
        } else if base_url.contains(":11434") {
            (
                "ollama",
                LlmCapabilities::SYSTEM_MESSAGES | LlmCapabilities::JSON_MODE,
            )
        } else {
            (
                "local",
                LlmCapabilities::SYSTEM_MESSAGES | LlmCapabilities::JSON_MODE,
            )
        };

        let config = OpenAiCompatibleConfig {
            base_url,
            api_key,
            default_model,
            provider_name: env::var(env_vars::LLM_PROVIDER_NAME)
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| provider_name.to_owned()),
            capabilities,
        };

        info!(
            "Initializing {} provider: base_url={}, model={}",
            config.provider_name, config.base_url, config.default_model
        );

        Self::new(config)
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    /// Parse error response from API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) else {
            return match status.as_u16() {
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    "LLM server is not responding",
                ),
                _ => AppError::external_service(
                    SERVICE_LABEL,
                    format!(
                        "API error ({}): {}",
                        status,
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            };
        };

        let detail = error_response.error;
        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("API authentication failed: {}", detail.message),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("LLM rate limit reached: {}", detail.message),
            ),
            503 => AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("Service unavailable: {}", detail.message),
            ),
            _ => AppError::external_service(
                SERVICE_LABEL,
                format!(
                    "{} - {}",
                    detail.error_type.unwrap_or_else(|| "unknown".to_owned()),
                    detail.message
                ),
            ),
        }
    }

    /// Send a chat completion request and return its first choice
    async fn send_chat(
        &self,
        openai_request: &OpenAiRequest,
    ) -> Result<(OpenAiChoice, String, Option<TokenUsage>), AppError> {
        debug!(
            "Sending chat completion request to {} with {} messages (structured={})",
            self.config.provider_name,
            openai_request.messages.len(),
            openai_request.response_format.is_some()
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "Failed to send request to {}: {}",
                    self.config.provider_name, e
                );
                if e.is_connect() {
                    AppError::new(
                        ErrorCode::ExternalServiceUnavailable,
                        format!(
                            "Cannot connect to {} at {}",
                            self.config.provider_name, self.config.base_url
                        ),
                    )
                } else if e.is_timeout() {
                    AppError::timeout("LLM request")
                } else {
                    AppError::external_service(SERVICE_LABEL, format!("Failed to connect: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(SERVICE_LABEL, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse API response: {} - body: {}",
                e,
                body.chars().take(500).collect::<String>()
            );
            AppError::external_service(SERVICE_LABEL, format!("Failed to parse response: {e}"))
        })?;

        let usage = openai_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt,
            completion_tokens: u.completion,
            total_tokens: u.total,
        });

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE_LABEL, "API returned no choices"))?;

        Ok((choice, openai_response.model, usage))
    }

    /// Build the message list for a structured call
    ///
    /// Without native schema support the schema is appended to the system
    /// prompt so the model still knows which fields to produce.
    fn structured_messages(
        request: &CompletionRequest,
        schema: &OutputSchema,
        mode: StructuredMode,
    ) -> Vec<OpenAiMessage> {
        let mut messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from).collect();

        if mode == StructuredMode::JsonSchema {
            return messages;
        }

        let instruction = format!(
            "Respond only with a single JSON object matching this JSON Schema:\n{}",
            schema.schema
        );
        match messages.first_mut() {
            Some(first) if first.role == MessageRole::System.as_str() => {
                first.content = format!("{}\n\n{instruction}", first.content);
            }
            _ => messages.insert(0, OpenAiMessage::from(&ChatMessage::system(instruction))),
        }
        messages
    }

    fn response_format(schema: &OutputSchema, mode: StructuredMode) -> Option<Value> {
        match mode {
            StructuredMode::JsonSchema => Some(json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "schema": schema.schema,
                    "strict": false
                }
            })),
            StructuredMode::JsonObject => Some(json!({ "type": "json_object" })),
            StructuredMode::PromptOnly => None,
        }
    }
}

/// Extract a JSON object from model output
///
/// Accepts bare JSON, JSON wrapped in a markdown code fence, or JSON embedded
/// in surrounding prose.
fn extract_json_object(text: &str) -> Result<Value, AppError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim);

    let candidate = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    };

    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        AppError::external_service(SERVICE_LABEL, format!("Structured output is not JSON: {e}"))
    })?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(AppError::external_service(
            SERVICE_LABEL,
            "Structured output is not a JSON object",
        ))
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: None,
            stream: false,
        };

        let (choice, model, usage) = self.send_chat(&openai_request).await?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from {}: {} chars, finish_reason: {:?}",
            self.config.provider_name,
            content.len(),
            choice.finish_reason
        );

        Ok(CompletionResponse {
            content,
            model,
            usage,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self, request, schema), fields(schema = schema.name))]
    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<Value, AppError> {
        let mode = StructuredMode::for_capabilities(self.config.capabilities);
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: Self::structured_messages(request, schema, mode),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: Self::response_format(schema, mode),
            stream: false,
        };

        let (choice, _, _) = self.send_chat(&openai_request).await?;

        if let Some(refusal) = choice.message.refusal {
            warn!("{} refused structured request: {}", schema.name, refusal);
            return Err(AppError::external_service(
                SERVICE_LABEL,
                format!("Model refused: {refusal}"),
            ));
        }

        let content = choice.message.content.unwrap_or_default();
        extract_json_object(&content)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let http_request = self.client.get(self.api_url("models"));

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("{} health check failed: {}", self.config.provider_name, e);
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("Health check failed: {e}"),
                )
            })?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(
                "{} health check failed with status: {}",
                self.config.provider_name,
                response.status()
            );
        }

        Ok(healthy)
    }
}
