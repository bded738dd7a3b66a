// ABOUTME: Request pipeline for the cooking assistant, written as an explicit stage machine
// ABOUTME: Moderates, classifies, dispatches one tool, and degrades to the fallback reply on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Assistant Pipeline
//!
//! ```text
//! Validating -> Moderating -> Classifying -> Dispatching -> Succeeded  -> Assembled
//!                   |              |              |                         ^
//!                   |              +--------------+--> FallingBack --------+
//!                   +--------------------------------(rejected)------------+
//! ```
//!
//! Every external call is bounded by the same [`RequestDeadline`]. Moderation
//! and suggestion failures are absorbed where they happen; tool failures move
//! the machine to `FallingBack`. Only a validation error or a failure of the
//! fallback call itself leaves [`CookingAssistant::handle`] as an `Err`.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::context::build_conversation_context;
use super::deadline::RequestDeadline;
use super::fallback::FallbackResponder;
use super::intent::{classify, Intent};
use super::moderation::ContentModerator;
use super::response::ChatResponse;
use super::suggestions::SuggestionGenerator;
use super::tools::{TimerRegistration, ToolDispatcher, ToolResult};
use super::types::{ChatRequest, StepTipsRequest, SubstitutionRequest};
use crate::constants::assistant::{DEFAULT_EXPERIENCE_LEVEL, DEFAULT_RECIPE_CONTEXT};
use crate::errors::AppResult;
use crate::llm::LlmProvider;

/// Why the pipeline took the fallback path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No classifier rule matched
    NoIntent,
    /// The matched tool produced no usable result
    ToolFailed {
        /// Intent whose tool failed
        intent: Intent,
        /// Failure label (`call_failed`, `incomplete`, `malformed`)
        kind: &'static str,
    },
}

impl FallbackReason {
    /// Short label for structured logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoIntent => "no_intent",
            Self::ToolFailed { .. } => "tool_failed",
        }
    }
}

/// One state of the request pipeline
#[derive(Debug)]
pub enum PipelineStage {
    /// Checking request invariants
    Validating,
    /// Asking the moderator about the message
    Moderating,
    /// Building context and choosing an intent
    Classifying,
    /// Running the tool for a matched intent
    Dispatching {
        /// Matched intent
        intent: Intent,
        /// Prompt context
        context: String,
    },
    /// The tool returned a complete result
    Succeeded(ToolResult),
    /// Producing a free-form reply
    FallingBack {
        /// Why
        reason: FallbackReason,
        /// Prompt context
        context: String,
    },
    /// Final response ready
    Assembled(ChatResponse),
}

impl PipelineStage {
    /// Stage name for structured logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Moderating => "moderating",
            Self::Classifying => "classifying",
            Self::Dispatching { .. } => "dispatching",
            Self::Succeeded(_) => "succeeded",
            Self::FallingBack { .. } => "falling_back",
            Self::Assembled(_) => "assembled",
        }
    }
}

/// The cooking assistant: one generation provider plus a per-request budget
#[derive(Clone)]
pub struct CookingAssistant {
    provider: Arc<dyn LlmProvider>,
    request_timeout: Duration,
}

impl CookingAssistant {
    /// Create an assistant over `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, request_timeout: Duration) -> Self {
        Self {
            provider,
            request_timeout,
        }
    }

    /// Name of the underlying provider
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Check that the generation service is reachable
    ///
    /// # Errors
    ///
    /// Returns the provider's health check error
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }

    /// Answer one chat message
    ///
    /// # Errors
    ///
    /// Returns a 400-class error for an invalid request and the generation
    /// error when the fallback reply cannot be produced
    #[instrument(skip_all, fields(voice = request.is_voice_command, intent = tracing::field::Empty))]
    pub async fn handle(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let deadline = RequestDeadline::after(self.request_timeout);
        let provider = self.provider.as_ref();
        let mut stage = PipelineStage::Validating;

        loop {
            tracing::debug!(stage = stage.name(), "Pipeline stage");
            stage = match stage {
                PipelineStage::Validating => {
                    request.validate()?;
                    PipelineStage::Moderating
                }
                PipelineStage::Moderating => {
                    let verdict = ContentModerator::new(provider, &deadline)
                        .check(&request.message)
                        .await;
                    if verdict.is_valid {
                        PipelineStage::Classifying
                    } else {
                        info!(reason = ?verdict.reason, "Message rejected by moderation");
                        PipelineStage::Assembled(ChatResponse::rejected(&verdict))
                    }
                }
                PipelineStage::Classifying => {
                    let context = build_conversation_context(
                        &request.conversation_history,
                        &request.message,
                    );
                    let intent = classify(&request.message);
                    tracing::Span::current().record("intent", intent.as_str());

                    if intent == Intent::Fallback {
                        PipelineStage::FallingBack {
                            reason: FallbackReason::NoIntent,
                            context,
                        }
                    } else {
                        PipelineStage::Dispatching { intent, context }
                    }
                }
                PipelineStage::Dispatching { intent, context } => {
                    match ToolDispatcher::new(provider, &deadline)
                        .dispatch(intent, &context)
                        .await
                    {
                        Ok(result) => PipelineStage::Succeeded(result),
                        Err(failure) => {
                            warn!(
                                %intent,
                                fallback_reason = failure.kind(),
                                error = %failure,
                                "Tool dispatch failed, falling back"
                            );
                            PipelineStage::FallingBack {
                                reason: FallbackReason::ToolFailed {
                                    intent,
                                    kind: failure.kind(),
                                },
                                context,
                            }
                        }
                    }
                }
                PipelineStage::Succeeded(result) => {
                    PipelineStage::Assembled(Self::realize(result, request, provider, &deadline).await)
                }
                PipelineStage::FallingBack { reason, context } => {
                    info!(fallback_reason = reason.as_str(), "Generating fallback reply");
                    PipelineStage::Assembled(
                        FallbackResponder::new(provider, &deadline)
                            .respond(&context)
                            .await?,
                    )
                }
                PipelineStage::Assembled(response) => return Ok(response),
            };
        }
    }

    /// Turn a validated tool result into the response, running its side effects
    async fn realize(
        result: ToolResult,
        request: &ChatRequest,
        provider: &dyn LlmProvider,
        deadline: &RequestDeadline,
    ) -> ChatResponse {
        match result {
            ToolResult::Timer(timer) => {
                TimerRegistration::new(&timer, request.recipe_id.as_deref(), request.current_step)
                    .register();
                ChatResponse::timer(&timer, request.current_step, request.is_voice_command)
            }
            ToolResult::Navigation(nav) => ChatResponse::navigation(nav),
            ToolResult::Modification(modification) => ChatResponse::modification(modification),
            ToolResult::Prep(prep) => {
                let suggestions = SuggestionGenerator::new(provider, deadline)
                    .prep(&prep, request)
                    .await;
                ChatResponse::prep_work(prep, suggestions)
            }
            ToolResult::Timing(timing) => {
                let suggestions = SuggestionGenerator::new(provider, deadline)
                    .timing(&timing, request)
                    .await;
                ChatResponse::timing(timing, suggestions, request.is_voice_command)
            }
        }
    }

    /// Tips for the active step
    ///
    /// # Errors
    ///
    /// Returns a 400-class error when the step description is missing and the
    /// generation error when the call fails
    #[instrument(skip_all)]
    pub async fn step_tips(&self, request: &StepTipsRequest) -> AppResult<Vec<String>> {
        let description = request.step_description()?;
        let level = request
            .user_experience_level
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_EXPERIENCE_LEVEL);

        let deadline = RequestDeadline::after(self.request_timeout);
        SuggestionGenerator::new(self.provider.as_ref(), &deadline)
            .step_tips(description, level)
            .await
    }

    /// Substitutes for an ingredient
    ///
    /// # Errors
    ///
    /// Returns a 400-class error when the ingredient is missing and the
    /// generation error when the call fails
    #[instrument(skip_all)]
    pub async fn substitutions(&self, request: &SubstitutionRequest) -> AppResult<Vec<String>> {
        let ingredient = request.ingredient()?;
        let recipe_context = request
            .recipe_context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_RECIPE_CONTEXT);

        let deadline = RequestDeadline::after(self.request_timeout);
        SuggestionGenerator::new(self.provider.as_ref(), &deadline)
            .substitutions(ingredient, recipe_context)
            .await
    }
}
