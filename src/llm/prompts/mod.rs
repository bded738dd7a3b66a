// ABOUTME: Prompt templates for the cooking assistant, compiled in from markdown files
// ABOUTME: Renders moderation, suggestion, step-tip, and substitution prompts with request fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.
//! Templates use `{name}` placeholders filled by [`render`].

use crate::constants::assistant::NOT_SPECIFIED;

/// Mise cooking assistant system prompt
///
/// Shared by every tool extraction call and by the fallback reply so the
/// model sees the same framing whichever path a request takes.
pub const COOKING_SYSTEM_PROMPT: &str = include_str!("cooking_system.md");

/// Moderation system prompt
pub const MODERATION_SYSTEM_PROMPT: &str = include_str!("moderation_system.md");

/// Substitutions system prompt
pub const SUBSTITUTIONS_SYSTEM_PROMPT: &str = include_str!("substitutions_system.md");

const MODERATION_REQUEST_TEMPLATE: &str = include_str!("moderation_request.md");
const PREP_SUGGESTIONS_TEMPLATE: &str = include_str!("prep_suggestions.md");
const TIMING_SUGGESTIONS_TEMPLATE: &str = include_str!("timing_suggestions.md");
const STEP_TIPS_TEMPLATE: &str = include_str!("step_tips.md");

/// User prompt for the prep suggestion call
pub const PREP_SUGGESTIONS_PROMPT: &str = "Generate prep work suggestions:";
/// User prompt for the timing suggestion call
pub const TIMING_SUGGESTIONS_PROMPT: &str = "Generate timing suggestions:";
/// User prompt for the step tips call
pub const STEP_TIPS_PROMPT: &str = "Generate helpful cooking suggestions for this step:";

/// Fill `{key}` placeholders in a template
///
/// Values are substituted in a single left-to-right pass, so text inside a
/// value is never itself treated as a placeholder.
#[must_use]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn or_not_specified(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NOT_SPECIFIED)
}

/// Moderation question for one incoming message
#[must_use]
pub fn moderation_request(message: &str) -> String {
    render(MODERATION_REQUEST_TEMPLATE, &[("message", message)])
}

/// System prompt for prep work suggestions
#[must_use]
pub fn prep_suggestions_system(
    prep_type: &str,
    focus: &str,
    current_step_description: Option<&str>,
    recipe_name: Option<&str>,
) -> String {
    render(
        PREP_SUGGESTIONS_TEMPLATE,
        &[
            ("prep_type", prep_type),
            ("focus", focus),
            ("current_step", or_not_specified(current_step_description)),
            ("recipe", or_not_specified(recipe_name)),
        ],
    )
}

/// System prompt for timing suggestions
#[must_use]
pub fn timing_suggestions_system(
    timing_type: &str,
    context: &str,
    current_step: Option<u32>,
    total_steps: Option<u32>,
) -> String {
    let current_step = current_step.map(|n| n.to_string());
    let total_steps = total_steps.map(|n| n.to_string());
    render(
        TIMING_SUGGESTIONS_TEMPLATE,
        &[
            ("timing_type", timing_type),
            ("context", context),
            ("current_step", or_not_specified(current_step.as_deref())),
            ("total_steps", or_not_specified(total_steps.as_deref())),
        ],
    )
}

/// System prompt for per-step cooking tips
#[must_use]
pub fn step_tips_system(current_step_description: &str, experience_level: &str) -> String {
    render(
        STEP_TIPS_TEMPLATE,
        &[
            ("current_step", current_step_description),
            ("experience_level", experience_level),
        ],
    )
}

/// User prompt for ingredient substitutions
#[must_use]
pub fn substitutions_request(ingredient: &str, recipe_context: &str) -> String {
    format!("Ingredient: {ingredient}\nRecipe context: {recipe_context}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let out = render("a {x} b {y} {", &[("x", "1")]);
        assert_eq!(out, "a 1 b {y} {");
    }

    #[test]
    fn test_render_does_not_expand_inside_values() {
        let out = render("{message}", &[("message", "{message} twice")]);
        assert_eq!(out, "{message} twice");
    }

    #[test]
    fn test_moderation_request_quotes_message() {
        let prompt = moderation_request("how do I sear scallops?");
        assert!(prompt.contains("Request: \"how do I sear scallops?\""));
        assert!(prompt.contains("\"isValid\": boolean"));
    }

    #[test]
    fn test_prep_prompt_fills_missing_fields() {
        let prompt = prep_suggestions_system("ingredients", "vegetables", None, Some("Ratatouille"));
        assert!(prompt.contains("Prep type: ingredients"));
        assert!(prompt.contains("Current step: Not specified"));
        assert!(prompt.contains("Recipe: Ratatouille"));
    }

    #[test]
    fn test_timing_prompt_formats_step_numbers() {
        let prompt = timing_suggestions_system("overall", "roast chicken", Some(3), None);
        assert!(prompt.contains("Current step: 3"));
        assert!(prompt.contains("Total steps: Not specified"));
    }

    #[test]
    fn test_cooking_prompt_names_assistant() {
        assert!(COOKING_SYSTEM_PROMPT.starts_with("You are Mise"));
    }
}
