// ABOUTME: Chat response envelope and the assembler that builds it from each pipeline outcome
// ABOUTME: Holds at most one action payload so the client never sees conflicting actions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Envelope
//!
//! [`ChatResponse`] is what every successful `POST /api/cooking-chat` returns,
//! including degraded replies. The action payload is one optional
//! [`ResponseAction`] flattened into the envelope, so exactly one of
//! `timerAction`, `navigationAction`, `modificationAction`, `prepWorkAction`,
//! or `timingAction` appears, or none.

use serde::{Deserialize, Serialize};

use super::moderation::ModerationVerdict;
use super::tools::{
    format_duration, stage_label, ModificationResult, ModificationType, NavigationDirection,
    NavigationResult, PrepResult, PrepType, TimerResult, TimingResult, TimingType,
};
use crate::constants::assistant::{
    EMPTY_FALLBACK_REPLY, FALLBACK_CONTEXT_TAG, FALLBACK_QUICK_ACTIONS, REJECTION_SUGGESTIONS,
};

/// Client instruction to start a timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerAction {
    /// Always `create`
    pub action: String,
    /// Countdown length in seconds
    pub duration: u32,
    /// What the timer is for
    pub description: String,
    /// Session stage label
    pub stage: String,
}

/// Client instruction to move between steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationAction {
    /// Where to move
    pub action: NavigationDirection,
    /// Target step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    /// Explanation
    pub reason: String,
}

/// Client instruction to change the recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationAction {
    /// What kind of change
    #[serde(rename = "type")]
    pub modification_type: ModificationType,
    /// What is changed
    pub target: String,
    /// Replacement value or instruction
    pub new_value: String,
    /// Explanation
    pub reason: String,
}

/// Prep guidance payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepWorkAction {
    /// Kind of prep
    #[serde(rename = "type")]
    pub prep_type: PrepType,
    /// Focus area
    pub focus: String,
    /// Ordered prep suggestions
    pub suggestions: Vec<String>,
}

/// Timing guidance payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingAction {
    /// Kind of timing guidance
    #[serde(rename = "type")]
    pub timing_type: TimingType,
    /// Cooking context
    pub context: String,
    /// Ordered timing suggestions
    pub suggestions: Vec<String>,
}

/// The single structured action a response may carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseAction {
    /// Start a timer
    #[serde(rename = "timerAction")]
    Timer(TimerAction),
    /// Move between steps
    #[serde(rename = "navigationAction")]
    Navigation(NavigationAction),
    /// Change the recipe
    #[serde(rename = "modificationAction")]
    Modification(ModificationAction),
    /// Prep guidance
    #[serde(rename = "prepWorkAction")]
    PrepWork(PrepWorkAction),
    /// Timing guidance
    #[serde(rename = "timingAction")]
    Timing(TimingAction),
}

impl ResponseAction {
    /// JSON key this action serializes under
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Timer(_) => "timerAction",
            Self::Navigation(_) => "navigationAction",
            Self::Modification(_) => "modificationAction",
            Self::PrepWork(_) => "prepWorkAction",
            Self::Timing(_) => "timingAction",
        }
    }
}

/// Body of a successful chat reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Text shown or spoken to the cook; never empty
    pub response: String,
    /// Structured action, if any
    #[serde(flatten)]
    pub action: Option<ResponseAction>,
    /// Follow-up suggestions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// Quick-action chips
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_actions: Option<Vec<String>>,
    /// Context tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ChatResponse {
    fn with_action(response: String, action: ResponseAction) -> Self {
        Self {
            response,
            action: Some(action),
            suggestions: None,
            quick_actions: None,
            context: None,
        }
    }

    /// Reply to a message the moderator blocked
    #[must_use]
    pub fn rejected(verdict: &ModerationVerdict) -> Self {
        let reason = verdict
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map_or_else(String::new, |r| format!(" {r}"));

        Self {
            response: format!(
                "I apologize, but I can only assist with cooking-related requests.{reason} Please feel free to ask me about recipes, cooking techniques, or kitchen help!"
            ),
            action: None,
            suggestions: Some(REJECTION_SUGGESTIONS.iter().map(|s| (*s).to_owned()).collect()),
            quick_actions: None,
            context: None,
        }
    }

    /// Confirmation for a started timer
    #[must_use]
    pub fn timer(timer: &TimerResult, current_step: Option<u32>, is_voice: bool) -> Self {
        let mut response = format!(
            "I've started a timer for {} ({}).",
            timer.description,
            format_duration(timer.duration)
        );
        if !is_voice {
            response.push_str(" The timer is now running in your cooking session.");
        }

        Self::with_action(
            response,
            ResponseAction::Timer(TimerAction {
                action: "create".to_owned(),
                duration: timer.duration,
                description: timer.description.clone(),
                stage: stage_label(current_step),
            }),
        )
    }

    /// Step navigation reply
    #[must_use]
    pub fn navigation(nav: NavigationResult) -> Self {
        Self::with_action(
            nav.reason.clone(),
            ResponseAction::Navigation(NavigationAction {
                action: nav.action,
                step_number: nav.step_number,
                reason: nav.reason,
            }),
        )
    }

    /// Recipe modification reply
    #[must_use]
    pub fn modification(modification: ModificationResult) -> Self {
        Self::with_action(
            modification.reason.clone(),
            ResponseAction::Modification(ModificationAction {
                modification_type: modification.modification_type,
                target: modification.target,
                new_value: modification.new_value,
                reason: modification.reason,
            }),
        )
    }

    /// Prep guidance reply
    #[must_use]
    pub fn prep_work(prep: PrepResult, suggestions: Vec<String>) -> Self {
        Self::with_action(
            format!("Here's what you need to prepare: {}", suggestions.join(", ")),
            ResponseAction::PrepWork(PrepWorkAction {
                prep_type: prep.prep_type,
                focus: prep.focus,
                suggestions,
            }),
        )
    }

    /// Timing guidance reply
    #[must_use]
    pub fn timing(timing: TimingResult, suggestions: Vec<String>, is_voice: bool) -> Self {
        let lead = if is_voice {
            "Here's the timing:"
        } else {
            "Here's the timing guidance:"
        };
        Self::with_action(
            format!("{lead} {}", suggestions.join(", ")),
            ResponseAction::Timing(TimingAction {
                timing_type: timing.timing_type,
                context: timing.context,
                suggestions,
            }),
        )
    }

    /// Free-form reply with quick actions
    ///
    /// Blank text is replaced so the response is never empty.
    #[must_use]
    pub fn fallback(text: &str) -> Self {
        let trimmed = text.trim();
        let response = if trimmed.is_empty() {
            EMPTY_FALLBACK_REPLY
        } else {
            trimmed
        };

        Self {
            response: response.to_owned(),
            action: None,
            suggestions: Some(Vec::new()),
            quick_actions: Some(
                FALLBACK_QUICK_ACTIONS
                    .iter()
                    .map(|s| (*s).to_owned())
                    .collect(),
            ),
            context: Some(FALLBACK_CONTEXT_TAG.to_owned()),
        }
    }
}
