// ABOUTME: Heuristic intent classifier built as an ordered table of keyword predicates
// ABOUTME: First matching rule wins; unmatched messages go to the fallback responder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Intent Classification
//!
//! Predicates overlap ("boil for 5 minutes then go to step 3" matches both
//! `timer` and `navigate`), so [`INTENT_RULES`] order is part of the
//! behavior. Changing the order changes which tool runs.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// What kind of help a message asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Start a countdown timer
    Timer,
    /// Move between recipe steps
    Navigate,
    /// Change an ingredient, time, temperature, technique, or quantity
    Modify,
    /// Prep work guidance
    Prep,
    /// Timing and scheduling guidance
    Timing,
    /// Free-form conversation
    Fallback,
}

impl Intent {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Navigate => "navigate",
            Self::Modify => "modify",
            Self::Prep => "prep",
            Self::Timing => "timing",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number followed by a time unit ("10 minutes", "1hour", "30 seconds")
static DURATION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[0-9]+\s*(minute|hour|second)").ok());

/// One `(predicate, intent)` pair of the classifier table
pub struct IntentRule {
    /// Intent selected when the predicate holds
    pub intent: Intent,
    /// Predicate over the lowercased message
    pub matches: fn(&str) -> bool,
}

fn contains_any(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| message.contains(needle))
}

fn is_timer_request(message: &str) -> bool {
    contains_any(
        message,
        &[
            "timer",
            "set timer",
            "cook for",
            "boil for",
            "simmer for",
            "bake for",
        ],
    ) || DURATION_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(message))
}

fn is_navigation_request(message: &str) -> bool {
    contains_any(
        message,
        &["next step", "move to next", "previous step", "go back"],
    ) || (message.contains("step") && message.bytes().any(|b| b.is_ascii_digit()))
}

fn is_modification_request(message: &str) -> bool {
    contains_any(
        message,
        &[
            "substitute",
            "replace",
            "change",
            "modify",
            "instead of",
            "alternative",
        ],
    )
}

fn is_prep_request(message: &str) -> bool {
    contains_any(
        message,
        &["prep", "prepare", "setup", "get ready", "what do i need"],
    )
}

fn is_timing_request(message: &str) -> bool {
    contains_any(
        message,
        &["how long", "timing", "when", "schedule", "time management"],
    )
}

/// Classifier table, evaluated top to bottom
pub const INTENT_RULES: [IntentRule; 5] = [
    IntentRule {
        intent: Intent::Timer,
        matches: is_timer_request,
    },
    IntentRule {
        intent: Intent::Navigate,
        matches: is_navigation_request,
    },
    IntentRule {
        intent: Intent::Modify,
        matches: is_modification_request,
    },
    IntentRule {
        intent: Intent::Prep,
        matches: is_prep_request,
    },
    IntentRule {
        intent: Intent::Timing,
        matches: is_timing_request,
    },
];

/// Select the intent for `message`
#[must_use]
pub fn classify(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map_or(Intent::Fallback, |rule| rule.intent)
}
