// ABOUTME: LLM provider abstraction layer for the cooking assistant's generation calls
// ABOUTME: Defines free-text and schema-constrained completion contracts plus message types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Service Provider Interface
//!
//! The assistant talks to its generation service only through [`LlmProvider`].
//! Two call shapes exist:
//!
//! - **free-text**: [`LlmProvider::complete`] returns plain text
//! - **structured**: [`LlmProvider::complete_structured`] returns a JSON object
//!   constrained by an [`OutputSchema`]
//!
//! Providers report transport, HTTP, and parse failures as [`AppError`]; they
//! never check required fields. That validation belongs to the caller, which
//! knows what a complete result looks like.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mise_chat::llm::{CompletionRequest, LlmProvider, OpenAiCompatibleProvider};
//!
//! async fn example() -> Result<(), mise_chat::errors::AppError> {
//!     let provider = OpenAiCompatibleProvider::from_env()?;
//!     let request = CompletionRequest::prompted("You are a cooking expert.", "How do I dice an onion?")
//!         .with_temperature(0.3)
//!         .with_max_tokens(200);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

mod openai_compatible;
pub mod prompts;

pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::generation::CallBudget;
use crate::errors::AppError;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// LLM provider capability flags
    ///
    /// Structured calls use these to choose between native JSON-schema output,
    /// plain JSON mode, or schema instructions embedded in the prompt.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider supports system messages
        const SYSTEM_MESSAGES = 0b0000_0001;
        /// Provider supports `response_format: json_object`
        const JSON_MODE = 0b0000_0010;
        /// Provider supports `response_format: json_schema`
        const STRUCTURED_OUTPUT = 0b0000_0100;
    }
}

impl LlmCapabilities {
    /// Capabilities of hosted `OpenAI` models
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::SYSTEM_MESSAGES
            .union(Self::JSON_MODE)
            .union(Self::STRUCTURED_OUTPUT)
    }

    /// Check if native schema-constrained output is supported
    #[must_use]
    pub const fn supports_structured_output(&self) -> bool {
        self.contains(Self::STRUCTURED_OUTPUT)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message sent to the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for one completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a new completion request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a request from a system prompt and a single user prompt
    #[must_use]
    pub fn prompted(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::system(system), ChatMessage::user(prompt)])
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Apply a temperature and output budget together
    #[must_use]
    pub const fn with_budget(self, budget: CallBudget) -> Self {
        self.with_temperature(budget.temperature)
            .with_max_tokens(budget.max_tokens)
    }

    /// The system prompt, if the first message is one
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }
}

/// Response from a free-text completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

/// Output schema for a structured completion
///
/// `schema` is a JSON Schema object document. `required` lists the fields a
/// result must carry to be usable; it mirrors the schema's own `required`
/// array and is what callers validate against.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Schema name sent to the provider (`[a-zA-Z0-9_-]`)
    pub name: &'static str,
    /// JSON Schema document
    pub schema: Value,
    /// Fields that must be present for a result to count as complete
    pub required: &'static [&'static str],
}

impl OutputSchema {
    /// Build a schema from its parts
    #[must_use]
    pub fn new(name: &'static str, schema: Value, required: &'static [&'static str]) -> Self {
        Self {
            name,
            schema,
            required,
        }
    }

    /// Names of the required fields absent (or null) in `object`
    #[must_use]
    pub fn missing_fields(&self, object: &Value) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|field| object.get(field).map_or(true, Value::is_null))
            .collect()
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for the assistant's generation calls
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier used in logs and readiness reports (e.g., "openai", "ollama")
    fn name(&self) -> &str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a free-text completion
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, AppError>;

    /// Perform a schema-constrained completion and return the parsed JSON object
    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<Value, AppError>;

    /// Check if the provider is reachable and the API key is valid
    async fn health_check(&self) -> Result<bool, AppError>;
}
