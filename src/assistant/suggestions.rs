// ABOUTME: Free-text suggestion generators for prep work, timing, step tips, and substitutions
// ABOUTME: Splits generated text into clean lines; chat-path generators fall back to fixed lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use super::deadline::{CallKind, RequestDeadline};
use super::tools::{PrepResult, TimingResult};
use super::types::ChatRequest;
use crate::constants::assistant::{DEFAULT_PREP_SUGGESTIONS, DEFAULT_TIMING_SUGGESTIONS};
use crate::constants::generation::{self, CallBudget};
use crate::errors::AppResult;
use crate::llm::{prompts, CompletionRequest, LlmProvider};

/// Leading ordinal such as `1. ` or `2) `
static ORDINAL_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[.)]\s*").ok());

/// Split generated text into suggestion lines
///
/// Blank lines are dropped and leading ordinals stripped. Order is kept.
#[must_use]
pub fn parse_suggestion_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            ORDINAL_PREFIX
                .as_ref()
                .map_or(line, |pattern| {
                    pattern.find(line).map_or(line, |m| &line[m.end()..])
                })
                .trim()
                .to_owned()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn defaults(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

/// Secondary free-text calls that produce short suggestion lists
pub struct SuggestionGenerator<'a> {
    provider: &'a dyn LlmProvider,
    deadline: &'a RequestDeadline,
}

impl<'a> SuggestionGenerator<'a> {
    /// Create a generator bound to one request's budget
    #[must_use]
    pub const fn new(provider: &'a dyn LlmProvider, deadline: &'a RequestDeadline) -> Self {
        Self { provider, deadline }
    }

    async fn generate(
        &self,
        kind: CallKind,
        operation: &str,
        system: String,
        prompt: &str,
        budget: CallBudget,
    ) -> AppResult<Vec<String>> {
        let request = CompletionRequest::prompted(system, prompt).with_budget(budget);
        let response = self
            .deadline
            .run(kind, operation, self.provider.complete(&request))
            .await?;
        Ok(parse_suggestion_lines(&response.content))
    }

    /// Prep work suggestions; never fails
    pub async fn prep(&self, prep: &PrepResult, request: &ChatRequest) -> Vec<String> {
        let system = prompts::prep_suggestions_system(
            prep.prep_type.as_str(),
            &prep.focus,
            request.current_step_description.as_deref(),
            request.recipe_name.as_deref(),
        );

        match self
            .generate(
                CallKind::Stage,
                "prep suggestions",
                system,
                prompts::PREP_SUGGESTIONS_PROMPT,
                generation::SUGGESTIONS,
            )
            .await
        {
            Ok(lines) if !lines.is_empty() => lines,
            Ok(_) => {
                warn!("Prep suggestions came back empty, using defaults");
                defaults(&DEFAULT_PREP_SUGGESTIONS)
            }
            Err(e) => {
                warn!(error = %e, "Prep suggestions failed, using defaults");
                defaults(&DEFAULT_PREP_SUGGESTIONS)
            }
        }
    }

    /// Timing suggestions; never fails
    pub async fn timing(&self, timing: &TimingResult, request: &ChatRequest) -> Vec<String> {
        let system = prompts::timing_suggestions_system(
            timing.timing_type.as_str(),
            &timing.context,
            request.current_step,
            request.total_steps,
        );

        match self
            .generate(
                CallKind::Stage,
                "timing suggestions",
                system,
                prompts::TIMING_SUGGESTIONS_PROMPT,
                generation::SUGGESTIONS,
            )
            .await
        {
            Ok(lines) if !lines.is_empty() => lines,
            Ok(_) => {
                warn!("Timing suggestions came back empty, using defaults");
                defaults(&DEFAULT_TIMING_SUGGESTIONS)
            }
            Err(e) => {
                warn!(error = %e, "Timing suggestions failed, using defaults");
                defaults(&DEFAULT_TIMING_SUGGESTIONS)
            }
        }
    }

    /// Tips for the active step
    ///
    /// # Errors
    ///
    /// Returns the generation error; there is no default list for tips
    pub async fn step_tips(
        &self,
        step_description: &str,
        experience_level: &str,
    ) -> AppResult<Vec<String>> {
        self.generate(
            CallKind::Final,
            "step tips",
            prompts::step_tips_system(step_description, experience_level),
            prompts::STEP_TIPS_PROMPT,
            generation::STEP_TIPS,
        )
        .await
    }

    /// Substitutes for an ingredient
    ///
    /// # Errors
    ///
    /// Returns the generation error
    pub async fn substitutions(
        &self,
        ingredient: &str,
        recipe_context: &str,
    ) -> AppResult<Vec<String>> {
        self.generate(
            CallKind::Final,
            "substitutions",
            prompts::SUBSTITUTIONS_SYSTEM_PROMPT.to_owned(),
            &prompts::substitutions_request(ingredient, recipe_context),
            generation::SUBSTITUTIONS,
        )
        .await
    }
}
