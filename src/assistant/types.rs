// ABOUTME: Request types for the cooking chat endpoints with boundary validation
// ABOUTME: Deserializes camelCase JSON bodies and rejects blank required fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::error_messages;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    /// The cook
    User,
    /// Mise
    Assistant,
}

impl HistoryRole {
    /// Label used when the turn is written into a prompt
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One prior turn supplied by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who spoke
    pub role: HistoryRole,
    /// What was said
    pub content: String,
}

impl HistoryEntry {
    /// Create a history entry
    #[must_use]
    pub fn new(role: HistoryRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/cooking-chat`
///
/// Every field except `message` is optional ambient session state. The
/// request is self-contained: nothing here is persisted between calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The cook's utterance
    pub message: String,
    /// Recipe being cooked
    #[serde(default)]
    pub recipe_id: Option<String>,
    /// Display name of the recipe
    #[serde(default)]
    pub recipe_name: Option<String>,
    /// Recipe summary
    #[serde(default)]
    pub recipe_description: Option<String>,
    /// 1-based index of the active step
    #[serde(default)]
    pub current_step: Option<u32>,
    /// Number of steps in the recipe
    #[serde(default)]
    pub total_steps: Option<u32>,
    /// Text of the active step
    #[serde(default)]
    pub current_step_description: Option<String>,
    /// Steps already finished, in completion order
    #[serde(default)]
    pub completed_steps: Vec<u32>,
    /// Prior turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    /// Whether the utterance came from voice input
    #[serde(default)]
    pub is_voice_command: bool,
    /// Wake phrase that triggered voice input
    #[serde(default)]
    pub wake_phrase: Option<String>,
}

impl ChatRequest {
    /// Create a request carrying only a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Check boundary invariants
    ///
    /// # Errors
    ///
    /// Returns a 400-class error when `message` is blank after trimming
    pub fn validate(&self) -> AppResult<()> {
        if self.message.trim().is_empty() {
            return Err(invalid_request("message", "Message is required"));
        }
        Ok(())
    }
}

/// Body of `POST /api/cooking-chat/suggestions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTipsRequest {
    /// 1-based index of the active step
    #[serde(default)]
    pub current_step: Option<u32>,
    /// Text of the active step
    #[serde(default)]
    pub current_step_description: Option<String>,
    /// Cook's self-reported skill level
    #[serde(default)]
    pub user_experience_level: Option<String>,
}

impl StepTipsRequest {
    /// The step description, if present and not blank
    ///
    /// # Errors
    ///
    /// Returns a 400-class error when the description is missing or blank
    pub fn step_description(&self) -> AppResult<&str> {
        self.current_step_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| AppError::missing_field("Current step description is required"))
    }
}

/// Body of `POST /api/cooking-chat/substitutions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRequest {
    /// Ingredient to replace
    #[serde(default)]
    pub ingredient: Option<String>,
    /// What the ingredient is used for
    #[serde(default)]
    pub recipe_context: Option<String>,
}

impl SubstitutionRequest {
    /// The ingredient, if present and not blank
    ///
    /// # Errors
    ///
    /// Returns a 400-class error when the ingredient is missing or blank
    pub fn ingredient(&self) -> AppResult<&str> {
        self.ingredient
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .ok_or_else(|| AppError::missing_field("Ingredient is required"))
    }
}

/// Build the `{error: "Invalid request", details}` validation error
pub(crate) fn invalid_request(field: &str, message: &str) -> AppError {
    AppError::new(ErrorCode::InvalidInput, error_messages::INVALID_REQUEST).with_details(json!([
        { "path": [field], "message": message }
    ]))
}
