// ABOUTME: Free-form fallback reply used when no tool matched or a tool result was unusable
// ABOUTME: Last stage of the pipeline; its call failure is the only one that escapes as an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::debug;

use super::deadline::{CallKind, RequestDeadline};
use super::response::ChatResponse;
use crate::constants::generation;
use crate::errors::AppResult;
use crate::llm::{prompts, CompletionRequest, LlmProvider};

/// Generates a conversational reply with the assistant's system framing
pub struct FallbackResponder<'a> {
    provider: &'a dyn LlmProvider,
    deadline: &'a RequestDeadline,
}

impl<'a> FallbackResponder<'a> {
    /// Create a responder bound to one request's budget
    #[must_use]
    pub const fn new(provider: &'a dyn LlmProvider, deadline: &'a RequestDeadline) -> Self {
        Self { provider, deadline }
    }

    /// Reply to the conversation context
    ///
    /// # Errors
    ///
    /// Returns the generation error when the call fails or the request budget
    /// is exhausted. There is no further degradation step.
    pub async fn respond(&self, context: &str) -> AppResult<ChatResponse> {
        let request = CompletionRequest::prompted(prompts::COOKING_SYSTEM_PROMPT, context)
            .with_budget(generation::FALLBACK);

        let completion = self
            .deadline
            .run(
                CallKind::Final,
                "fallback reply",
                self.provider.complete(&request),
            )
            .await?;

        debug!(
            chars = completion.content.len(),
            finish_reason = ?completion.finish_reason,
            "Fallback reply generated"
        );
        Ok(ChatResponse::fallback(&completion.content))
    }
}
