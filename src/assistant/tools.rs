// ABOUTME: Per-intent output schemas, typed tool results, and the structured-call dispatcher
// ABOUTME: Validates every structured result for required fields before it counts as success
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Dispatch
//!
//! Each non-fallback [`Intent`] owns one [`OutputSchema`]. The dispatcher makes
//! exactly one structured call with that schema and turns the returned JSON
//! object into a [`ToolResult`] variant. Anything short of a complete,
//! well-typed object is a [`ToolFailure`]; the dispatcher never retries.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::deadline::{CallKind, RequestDeadline};
use super::intent::Intent;
use crate::constants::generation::{self, CallBudget};
use crate::errors::AppError;
use crate::llm::{prompts, CompletionRequest, LlmProvider, OutputSchema};

// ============================================================================
// Tool Result Types
// ============================================================================

/// Direction of a step navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationDirection {
    /// Advance one step
    Next,
    /// Go back one step
    Previous,
    /// Jump to `stepNumber`
    Specific,
}

/// What part of the recipe a modification touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationType {
    /// Swap or add an ingredient
    Ingredient,
    /// Adjust a cooking time
    Time,
    /// Adjust a temperature
    Temperature,
    /// Change a technique
    Technique,
    /// Scale a quantity
    Quantity,
}

/// Kind of prep work requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrepType {
    /// Washing, chopping, measuring
    Ingredients,
    /// Tools and cookware
    Equipment,
    /// Ordering prep ahead of cooking
    Timing,
    /// Techniques to practise before starting
    Techniques,
}

impl PrepType {
    /// Lowercase name used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ingredients => "ingredients",
            Self::Equipment => "equipment",
            Self::Timing => "timing",
            Self::Techniques => "techniques",
        }
    }
}

/// Kind of timing guidance requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingType {
    /// Timing of the current step
    Step,
    /// Whole-recipe timeline
    Overall,
    /// Running several tasks at once
    Parallel,
    /// Resting and carry-over times
    Resting,
}

impl TimingType {
    /// Lowercase name used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Overall => "overall",
            Self::Parallel => "parallel",
            Self::Resting => "resting",
        }
    }
}

/// Timer extraction result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerResult {
    /// Countdown length in seconds
    #[serde(deserialize_with = "whole_number")]
    pub duration: u32,
    /// What the timer is for
    pub description: String,
}

/// Step navigation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationResult {
    /// Where to move
    pub action: NavigationDirection,
    /// Target step for [`NavigationDirection::Specific`]
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub step_number: Option<u32>,
    /// Sentence explaining the move
    pub reason: String,
}

/// Recipe modification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationResult {
    /// What kind of change
    pub modification_type: ModificationType,
    /// Ingredient name, step number, or other target
    pub target: String,
    /// Replacement value or instruction
    pub new_value: String,
    /// Sentence explaining the change
    pub reason: String,
}

/// Prep work extraction result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepResult {
    /// Kind of prep
    pub prep_type: PrepType,
    /// Specific focus area
    pub focus: String,
}

/// Timing extraction result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingResult {
    /// Kind of timing guidance
    pub timing_type: TimingType,
    /// Cooking context the guidance is about
    pub context: String,
}

/// A validated structured result, one variant per tool intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    /// From [`Intent::Timer`]
    Timer(TimerResult),
    /// From [`Intent::Navigate`]
    Navigation(NavigationResult),
    /// From [`Intent::Modify`]
    Modification(ModificationResult),
    /// From [`Intent::Prep`]
    Prep(PrepResult),
    /// From [`Intent::Timing`]
    Timing(TimingResult),
}

impl ToolResult {
    /// The intent that produced this result
    #[must_use]
    pub const fn intent(&self) -> Intent {
        match self {
            Self::Timer(_) => Intent::Timer,
            Self::Navigation(_) => Intent::Navigate,
            Self::Modification(_) => Intent::Modify,
            Self::Prep(_) => Intent::Prep,
            Self::Timing(_) => Intent::Timing,
        }
    }

    /// Validate a structured object returned for `intent`
    ///
    /// # Errors
    ///
    /// Returns a [`ToolFailure`] if a required field is absent or null, a value
    /// has the wrong type or is outside its enumeration, or a text field that
    /// becomes user-facing is blank.
    pub fn from_object(intent: Intent, object: Value) -> Result<Self, ToolFailure> {
        let schema = schema_for(intent).ok_or(ToolFailure::NoTool(intent))?;

        let missing = schema.missing_fields(&object);
        if !missing.is_empty() {
            return Err(ToolFailure::Incomplete { missing });
        }

        let result = match intent {
            Intent::Timer => Self::Timer(parse(object)?),
            Intent::Navigate => Self::Navigation(parse(object)?),
            Intent::Modify => Self::Modification(parse(object)?),
            Intent::Prep => Self::Prep(parse(object)?),
            Intent::Timing => Self::Timing(parse(object)?),
            Intent::Fallback => return Err(ToolFailure::NoTool(intent)),
        };

        let blank = result.blank_fields();
        if blank.is_empty() {
            Ok(result)
        } else {
            Err(ToolFailure::Incomplete { missing: blank })
        }
    }

    /// Required fields whose values are present but unusable
    fn blank_fields(&self) -> Vec<&'static str> {
        let text_fields: Vec<(&'static str, &str)> = match self {
            Self::Timer(timer) => {
                if timer.duration == 0 {
                    return vec!["duration"];
                }
                vec![("description", timer.description.as_str())]
            }
            Self::Navigation(nav) => {
                if nav.action == NavigationDirection::Specific && nav.step_number.is_none() {
                    return vec!["stepNumber"];
                }
                vec![("reason", nav.reason.as_str())]
            }
            Self::Modification(modification) => vec![
                ("target", modification.target.as_str()),
                ("newValue", modification.new_value.as_str()),
                ("reason", modification.reason.as_str()),
            ],
            Self::Prep(prep) => vec![("focus", prep.focus.as_str())],
            Self::Timing(timing) => vec![("context", timing.context.as_str())],
        };

        text_fields
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

fn parse<T: for<'de> Deserialize<'de>>(object: Value) -> Result<T, ToolFailure> {
    serde_json::from_value(object).map_err(|e| ToolFailure::Malformed(e.to_string()))
}

/// Accept `600`, `600.0`, or `600.4` as 600 whole units
fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    to_whole_number(raw).ok_or_else(|| de::Error::custom(format!("{raw} is not a count")))
}

/// Optional counts are advisory: anything that is not a usable count reads as absent
fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_f64)
        .and_then(to_whole_number))
}

fn to_whole_number(raw: f64) -> Option<u32> {
    let rounded = raw.round();
    (rounded.is_finite() && rounded >= 0.0 && rounded <= f64::from(u32::MAX))
        .then_some(rounded as u32)
}

/// Why a tool dispatch produced no usable result
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// The generation call itself failed or timed out
    #[error("generation call failed: {0}")]
    Call(#[from] AppError),
    /// Required fields were absent, null, or blank
    #[error("result missing required fields: {}", .missing.join(", "))]
    Incomplete {
        /// Offending field names
        missing: Vec<&'static str>,
    },
    /// A field had the wrong type or an undeclared enum value
    #[error("result malformed: {0}")]
    Malformed(String),
    /// The intent has no tool
    #[error("no tool for intent {0}")]
    NoTool(Intent),
}

impl ToolFailure {
    /// Short label for structured logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Call(_) => "call_failed",
            Self::Incomplete { .. } => "incomplete",
            Self::Malformed(_) => "malformed",
            Self::NoTool(_) => "no_tool",
        }
    }
}

// ============================================================================
// Output Schemas
// ============================================================================

static TIMER_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    OutputSchema::new(
        "set_timer",
        json!({
            "type": "object",
            "properties": {
                "duration": {"type": "number", "description": "Duration of the timer in seconds"},
                "description": {"type": "string", "description": "What the timer is for"}
            },
            "required": ["duration", "description"]
        }),
        &["duration", "description"],
    )
});

static NAVIGATION_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    OutputSchema::new(
        "move_to_step",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["next", "previous", "specific"],
                    "description": "Navigation action"
                },
                "stepNumber": {
                    "type": "number",
                    "description": "Specific step number (only for 'specific' action)"
                },
                "reason": {"type": "string", "description": "Why this navigation is happening"}
            },
            "required": ["action", "reason"]
        }),
        &["action", "reason"],
    )
});

static MODIFICATION_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    OutputSchema::new(
        "modify_recipe",
        json!({
            "type": "object",
            "properties": {
                "modificationType": {
                    "type": "string",
                    "enum": ["ingredient", "time", "temperature", "technique", "quantity"],
                    "description": "Type of modification"
                },
                "target": {
                    "type": "string",
                    "description": "What is being modified (ingredient name, step number, etc.)"
                },
                "newValue": {"type": "string", "description": "The new value or instruction"},
                "reason": {"type": "string", "description": "Why this modification is needed"}
            },
            "required": ["modificationType", "target", "newValue", "reason"]
        }),
        &["modificationType", "target", "newValue", "reason"],
    )
});

static PREP_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    OutputSchema::new(
        "get_prep_work",
        json!({
            "type": "object",
            "properties": {
                "prepType": {
                    "type": "string",
                    "enum": ["ingredients", "equipment", "timing", "techniques"],
                    "description": "Type of prep work needed"
                },
                "focus": {"type": "string", "description": "Specific focus area for prep work"}
            },
            "required": ["prepType", "focus"]
        }),
        &["prepType", "focus"],
    )
});

static TIMING_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    OutputSchema::new(
        "get_timing_suggestions",
        json!({
            "type": "object",
            "properties": {
                "timingType": {
                    "type": "string",
                    "enum": ["step", "overall", "parallel", "resting"],
                    "description": "Type of timing guidance needed"
                },
                "context": {"type": "string", "description": "Current cooking context"}
            },
            "required": ["timingType", "context"]
        }),
        &["timingType", "context"],
    )
});

/// Output schema for a tool intent
#[must_use]
pub fn schema_for(intent: Intent) -> Option<&'static OutputSchema> {
    match intent {
        Intent::Timer => Some(&*TIMER_SCHEMA),
        Intent::Navigate => Some(&*NAVIGATION_SCHEMA),
        Intent::Modify => Some(&*MODIFICATION_SCHEMA),
        Intent::Prep => Some(&*PREP_SCHEMA),
        Intent::Timing => Some(&*TIMING_SCHEMA),
        Intent::Fallback => None,
    }
}

/// Temperature and output budget for a tool intent
#[must_use]
pub const fn budget_for(intent: Intent) -> CallBudget {
    match intent {
        Intent::Timer => generation::TIMER,
        Intent::Navigate => generation::NAVIGATE,
        Intent::Modify => generation::MODIFY,
        Intent::Prep => generation::PREP,
        Intent::Timing | Intent::Fallback => generation::TIMING,
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Issues the one structured call for a tool intent
pub struct ToolDispatcher<'a> {
    provider: &'a dyn LlmProvider,
    deadline: &'a RequestDeadline,
}

impl<'a> ToolDispatcher<'a> {
    /// Create a dispatcher bound to one request's budget
    #[must_use]
    pub const fn new(provider: &'a dyn LlmProvider, deadline: &'a RequestDeadline) -> Self {
        Self { provider, deadline }
    }

    /// Run the tool for `intent` against the conversation context
    ///
    /// # Errors
    ///
    /// Returns a [`ToolFailure`] when `intent` has no tool, the call fails or
    /// times out, or the result is incomplete
    pub async fn dispatch(&self, intent: Intent, context: &str) -> Result<ToolResult, ToolFailure> {
        let schema = schema_for(intent).ok_or(ToolFailure::NoTool(intent))?;
        let request = CompletionRequest::prompted(prompts::COOKING_SYSTEM_PROMPT, context)
            .with_budget(budget_for(intent));

        let object = self
            .deadline
            .run(
                CallKind::Stage,
                schema.name,
                self.provider.complete_structured(&request, schema),
            )
            .await?;

        debug!(%intent, "Structured result received");
        ToolResult::from_object(intent, object)
    }
}

// ============================================================================
// Timer Registration
// ============================================================================

/// Format seconds as `m:ss`
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Timer handed to the client's cooking session
///
/// Timers live on the client; registering one here only records it in the
/// service logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRegistration {
    /// Countdown length in seconds
    pub duration: u32,
    /// What the timer is for
    pub description: String,
    /// Session stage label, `Step {n}`
    pub stage: String,
    /// Recipe being cooked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    /// Active step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
}

impl TimerRegistration {
    /// Build a registration for `timer` at the given step
    #[must_use]
    pub fn new(timer: &TimerResult, recipe_id: Option<&str>, current_step: Option<u32>) -> Self {
        Self {
            duration: timer.duration,
            description: timer.description.clone(),
            stage: stage_label(current_step),
            recipe_id: recipe_id.map(str::to_owned),
            step_number: current_step,
        }
    }

    /// Record the timer under a fresh identifier
    pub fn register(&self) {
        let timer_id = Uuid::new_v4();
        info!(
            %timer_id,
            duration = self.duration,
            description = %self.description,
            stage = %self.stage,
            recipe_id = ?self.recipe_id,
            "Timer created"
        );
    }
}

/// `Step {n}` label for the active step, defaulting to step 1
#[must_use]
pub fn stage_label(current_step: Option<u32>) -> String {
    format!("Step {}", current_step.filter(|n| *n > 0).unwrap_or(1))
}
