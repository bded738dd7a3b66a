// ABOUTME: Scripted LLM provider for exercising the assistant without a generation service
// ABOUTME: Replies per schema or per free-text call kind and records every call it receives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use mise_chat::errors::{AppError, ErrorCode};
use mise_chat::llm::{
    prompts, CompletionRequest, CompletionResponse, LlmCapabilities, LlmProvider, MessageRole,
    OutputSchema,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Which free-text call a request is, recognised from its prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextCall {
    /// Free-form cooking reply
    Fallback,
    /// Prep suggestion list
    PrepSuggestions,
    /// Timing suggestion list
    TimingSuggestions,
    /// Step tips endpoint
    StepTips,
    /// Substitutions endpoint
    Substitutions,
}

impl TextCall {
    fn of(request: &CompletionRequest) -> Self {
        let system = request.system_prompt().unwrap_or_default();
        let user = last_user_message(request);

        if system == prompts::COOKING_SYSTEM_PROMPT {
            Self::Fallback
        } else if system == prompts::SUBSTITUTIONS_SYSTEM_PROMPT {
            Self::Substitutions
        } else if user == prompts::PREP_SUGGESTIONS_PROMPT {
            Self::PrepSuggestions
        } else if user == prompts::TIMING_SUGGESTIONS_PROMPT {
            Self::TimingSuggestions
        } else if user == prompts::STEP_TIPS_PROMPT {
            Self::StepTips
        } else {
            panic!("Unrecognised free-text call: {system:?} / {user:?}")
        }
    }
}

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum Reply {
    /// Structured call returns this object
    Object(Value),
    /// Free-text call returns this text
    Text(String),
    /// Call fails with this code
    Fail(ErrorCode),
    /// Call never completes
    Stall,
}

/// A call the provider received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Schema name for structured calls, `None` for free text
    pub schema: Option<&'static str>,
    /// Free-text call kind
    pub text_call: Option<TextCall>,
    /// System prompt
    pub system: String,
    /// Final user message
    pub user: String,
    /// Requested temperature
    pub temperature: Option<f32>,
    /// Requested output budget
    pub max_tokens: Option<u32>,
}

/// Provider answering from a fixed script
///
/// Anything left unscripted fails with `EXTERNAL_SERVICE_UNAVAILABLE`, so a
/// fresh `ScriptedProvider` behaves like a generation service that is down.
pub struct ScriptedProvider {
    structured: HashMap<&'static str, Reply>,
    text: HashMap<TextCall, Reply>,
    healthy: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// A provider whose every call fails
    pub fn new() -> Self {
        Self {
            structured: HashMap::new(),
            text: HashMap::new(),
            healthy: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer structured calls for `schema` with `object`
    pub fn with_object(mut self, schema: &'static str, object: Value) -> Self {
        self.structured.insert(schema, Reply::Object(object));
        self
    }

    /// Script a structured call outcome
    pub fn with_structured(mut self, schema: &'static str, reply: Reply) -> Self {
        self.structured.insert(schema, reply);
        self
    }

    /// Answer a free-text call kind with `text`
    pub fn with_text(mut self, call: TextCall, text: &str) -> Self {
        self.text.insert(call, Reply::Text(text.to_owned()));
        self
    }

    /// Script a free-text call outcome
    pub fn with_text_reply(mut self, call: TextCall, reply: Reply) -> Self {
        self.text.insert(call, reply);
        self
    }

    /// Moderation lets everything through
    pub fn allowing(self) -> Self {
        self.with_object("moderation_verdict", serde_json::json!({"isValid": true}))
    }

    /// Report the service as reachable
    pub const fn healthy(mut self) -> Self {
        self.healthy = true;
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Schema names of the structured calls received, in order
    pub fn schemas_called(&self) -> Vec<&'static str> {
        self.calls().iter().filter_map(|c| c.schema).collect()
    }

    /// Free-text calls received, in order
    pub fn text_calls(&self) -> Vec<TextCall> {
        self.calls().iter().filter_map(|c| c.text_call).collect()
    }

    fn record(
        &self,
        request: &CompletionRequest,
        schema: Option<&'static str>,
        text_call: Option<TextCall>,
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            schema,
            text_call,
            system: request.system_prompt().unwrap_or_default().to_owned(),
            user: last_user_message(request).to_owned(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        });
    }

    async fn play(reply: Option<Reply>) -> Result<Reply, AppError> {
        match reply {
            None => Err(unavailable()),
            Some(Reply::Fail(code)) => Err(AppError::new(code, "scripted failure")),
            Some(Reply::Stall) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(unavailable())
            }
            Some(reply) => Ok(reply),
        }
    }
}

fn unavailable() -> AppError {
    AppError::new(
        ErrorCode::ExternalServiceUnavailable,
        "scripted provider: no reply configured",
    )
}

fn last_user_message(request: &CompletionRequest) -> &str {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map_or("", |m| m.content.as_str())
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, AppError> {
        let call = TextCall::of(request);
        self.record(request, None, Some(call));

        match Self::play(self.text.get(&call).cloned()).await? {
            Reply::Text(content) => Ok(CompletionResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            other => panic!("Free-text call {call:?} scripted with {other:?}"),
        }
    }

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<Value, AppError> {
        self.record(request, Some(schema.name), None);

        match Self::play(self.structured.get(schema.name).cloned()).await? {
            Reply::Object(object) => Ok(object),
            other => panic!("Structured call {} scripted with {other:?}", schema.name),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(self.healthy)
    }
}
