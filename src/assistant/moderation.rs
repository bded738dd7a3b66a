// ABOUTME: Content moderation gate that asks the generation service whether a message is on-topic
// ABOUTME: Fails open so a moderation outage never blocks the cook
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::deadline::{CallKind, RequestDeadline};
use crate::constants::generation;
use crate::llm::{prompts, CompletionRequest, LlmProvider, OutputSchema};

static MODERATION_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    OutputSchema::new(
        "moderation_verdict",
        json!({
            "type": "object",
            "properties": {
                "isValid": {
                    "type": "boolean",
                    "description": "Whether the request is appropriate for a cooking assistant"
                },
                "reason": {
                    "type": "string",
                    "description": "Why the request was rejected (only when isValid is false)"
                }
            },
            "required": ["isValid"]
        }),
        &["isValid"],
    )
});

/// Outcome of the moderation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    /// Whether the message may proceed
    pub is_valid: bool,
    /// Rejection reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModerationVerdict {
    /// Verdict letting the message through
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    /// Verdict blocking the message
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Asks the generation service whether a message belongs in a cooking session
pub struct ContentModerator<'a> {
    provider: &'a dyn LlmProvider,
    deadline: &'a RequestDeadline,
}

impl<'a> ContentModerator<'a> {
    /// Create a moderator bound to one request's budget
    #[must_use]
    pub const fn new(provider: &'a dyn LlmProvider, deadline: &'a RequestDeadline) -> Self {
        Self { provider, deadline }
    }

    /// Judge `message`
    ///
    /// Call errors, timeouts, and unusable verdicts all resolve to
    /// [`ModerationVerdict::allowed`].
    pub async fn check(&self, message: &str) -> ModerationVerdict {
        let request = CompletionRequest::prompted(
            prompts::MODERATION_SYSTEM_PROMPT,
            prompts::moderation_request(message),
        )
        .with_budget(generation::MODERATION);

        let result = self
            .deadline
            .run(
                CallKind::Stage,
                "moderation",
                self.provider.complete_structured(&request, &MODERATION_SCHEMA),
            )
            .await;

        let object = match result {
            Ok(object) => object,
            Err(e) => {
                warn!(error = %e, "Moderation call failed, allowing message");
                return ModerationVerdict::allowed();
            }
        };

        match serde_json::from_value::<ModerationVerdict>(object) {
            Ok(verdict) => {
                debug!(is_valid = verdict.is_valid, "Moderation verdict");
                verdict
            }
            Err(e) => {
                warn!(error = %e, "Moderation verdict unusable, allowing message");
                ModerationVerdict::allowed()
            }
        }
    }
}
