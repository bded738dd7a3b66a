// ABOUTME: Integration tests for the cooking assistant pipeline over a scripted provider
// ABOUTME: Covers moderation, intent routing, tool validation, suggestions, and fallback behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use helpers::mock_llm::{Reply, ScriptedProvider, TextCall};
use mise_chat::assistant::{ChatRequest, ChatResponse, HistoryEntry, HistoryRole};
use mise_chat::constants::assistant::{
    DEFAULT_PREP_SUGGESTIONS, DEFAULT_TIMING_SUGGESTIONS, EMPTY_FALLBACK_REPLY,
    FALLBACK_QUICK_ACTIONS,
};
use mise_chat::errors::ErrorCode;
use mise_chat::llm::prompts;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

const ACTION_KEYS: [&str; 5] = [
    "timerAction",
    "navigationAction",
    "modificationAction",
    "prepWorkAction",
    "timingAction",
];

fn present_actions(response: &ChatResponse) -> Vec<&'static str> {
    let value = serde_json::to_value(response).unwrap();
    ACTION_KEYS
        .into_iter()
        .filter(|key| value.get(key).is_some())
        .collect()
}

fn pasta_timer() -> Value {
    json!({"duration": 600, "description": "pasta"})
}

fn assert_fallback_shape(response: &ChatResponse) {
    assert!(present_actions(response).is_empty());
    assert_eq!(response.suggestions.as_deref(), Some(&[][..]));
    assert_eq!(
        response.quick_actions.as_ref().unwrap().len(),
        FALLBACK_QUICK_ACTIONS.len()
    );
    assert_eq!(response.context.as_deref(), Some("cooking_assistance"));
}

// ============================================================================
// Timer
// ============================================================================

#[tokio::test]
async fn test_pasta_timer_creates_timer_action() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object("set_timer", pasta_timer()),
    );
    let assistant = common::test_assistant(provider.clone());

    let mut request = ChatRequest::new("Set a timer for 10 minutes for the pasta");
    request.current_step = Some(3);
    let response = assistant.handle(&request).await.unwrap();

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value["timerAction"],
        json!({"action": "create", "duration": 600, "description": "pasta", "stage": "Step 3"})
    );
    assert!(response.response.contains("pasta"));
    assert!(response.response.contains("10:00"));
    assert!(response
        .response
        .contains("The timer is now running in your cooking session."));
    assert_eq!(present_actions(&response), vec!["timerAction"]);

    assert_eq!(provider.schemas_called(), vec!["moderation_verdict", "set_timer"]);
    assert!(provider.text_calls().is_empty());
}

#[tokio::test]
async fn test_timer_stage_defaults_to_step_one() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object("set_timer", json!({"duration": 90, "description": "eggs"})),
    );
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("boil for 90 seconds"))
        .await
        .unwrap();

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["timerAction"]["stage"], "Step 1");
    assert!(response.response.contains("1:30"));
}

#[tokio::test]
async fn test_voice_timer_reply_is_shorter() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object("set_timer", pasta_timer()),
    );
    let assistant = common::test_assistant(provider);

    let mut request = ChatRequest::new("set a timer for ten minutes");
    request.is_voice_command = true;
    request.wake_phrase = Some("hey mise".to_owned());
    let response = assistant.handle(&request).await.unwrap();

    assert!(response.response.starts_with("I've started a timer for pasta"));
    assert!(!response.response.contains("The timer is now running"));
}

#[tokio::test]
async fn test_moderation_outage_does_not_block_timer() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_structured("moderation_verdict", Reply::Fail(ErrorCode::ExternalServiceError))
            .with_object("set_timer", pasta_timer()),
    );
    let assistant = common::test_assistant(provider.clone());

    let response = assistant
        .handle(&ChatRequest::new("Set a timer for 10 minutes for the pasta"))
        .await
        .unwrap();

    assert_eq!(present_actions(&response), vec!["timerAction"]);
    assert_eq!(provider.schemas_called(), vec!["moderation_verdict", "set_timer"]);
}

#[tokio::test]
async fn test_unusable_moderation_verdict_is_allowed() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_object("moderation_verdict", json!({"verdict": "fine"}))
            .with_object("set_timer", pasta_timer()),
    );
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("set a timer for 10 minutes"))
        .await
        .unwrap();
    assert_eq!(present_actions(&response), vec!["timerAction"]);
}

#[tokio::test]
async fn test_incomplete_timer_falls_back_without_action() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object("set_timer", json!({"duration": 600}))
            .with_text(TextCall::Fallback, "Pasta usually needs about ten minutes."),
    );
    let assistant = common::test_assistant(provider.clone());

    let response = assistant
        .handle(&ChatRequest::new("Set a timer for 10 minutes for the pasta"))
        .await
        .unwrap();

    assert_eq!(response.response, "Pasta usually needs about ten minutes.");
    assert_fallback_shape(&response);
    assert_eq!(provider.schemas_called(), vec!["moderation_verdict", "set_timer"]);
    assert_eq!(provider.text_calls(), vec![TextCall::Fallback]);
}

#[tokio::test]
async fn test_zero_duration_timer_falls_back() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object("set_timer", json!({"duration": 0, "description": "pasta"}))
            .with_text(TextCall::Fallback, "How long would you like?"),
    );
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("set a timer"))
        .await
        .unwrap();
    assert_eq!(response.response, "How long would you like?");
    assert_fallback_shape(&response);
}

// ============================================================================
// Validation and moderation
// ============================================================================

#[tokio::test]
async fn test_empty_message_is_rejected_before_any_call() {
    let provider = Arc::new(ScriptedProvider::new().allowing());
    let assistant = common::test_assistant(provider.clone());

    for message in ["", "   \n\t"] {
        let error = assistant
            .handle(&ChatRequest::new(message))
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.http_status(), 400);
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_message_gets_apology_and_no_tool_call() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_object(
                "moderation_verdict",
                json!({"isValid": false, "reason": "That topic is outside the kitchen."}),
            )
            .with_object("set_timer", pasta_timer()),
    );
    let assistant = common::test_assistant(provider.clone());

    let response = assistant
        .handle(&ChatRequest::new("set a timer and tell me the stock price"))
        .await
        .unwrap();

    assert!(response.response.starts_with(
        "I apologize, but I can only assist with cooking-related requests. That topic is outside the kitchen."
    ));
    assert_eq!(response.suggestions.as_ref().unwrap().len(), 4);
    assert!(present_actions(&response).is_empty());
    assert_eq!(provider.schemas_called(), vec!["moderation_verdict"]);
    assert!(provider.text_calls().is_empty());
}

#[tokio::test]
async fn test_moderation_sees_the_raw_message() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_text(TextCall::Fallback, "Sure."),
    );
    let assistant = common::test_assistant(provider.clone());

    assistant
        .handle(&ChatRequest::new("Is risotto hard to make?"))
        .await
        .unwrap();

    let moderation = &provider.calls()[0];
    assert_eq!(moderation.system, prompts::MODERATION_SYSTEM_PROMPT);
    assert!(moderation.user.contains("Is risotto hard to make?"));
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_next_step_uses_navigation_schema() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object(
                "move_to_step",
                json!({"action": "next", "reason": "Moving on to the sauce."}),
            ),
    );
    let assistant = common::test_assistant(provider.clone());

    let response = assistant
        .handle(&ChatRequest::new("next step please"))
        .await
        .unwrap();

    assert_eq!(provider.schemas_called(), vec!["moderation_verdict", "move_to_step"]);
    assert_eq!(response.response, "Moving on to the sauce.");
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value["navigationAction"],
        json!({"action": "next", "reason": "Moving on to the sauce."})
    );
}

#[tokio::test]
async fn test_specific_step_carries_step_number() {
    let provider = Arc::new(
        ScriptedProvider::new().allowing().with_object(
            "move_to_step",
            json!({"action": "specific", "stepNumber": 4, "reason": "Jumping to step 4."}),
        ),
    );
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("take me to step 4"))
        .await
        .unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["navigationAction"]["stepNumber"], 4);
}

#[tokio::test]
async fn test_timer_wins_over_navigation() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object("set_timer", pasta_timer()),
    );
    let assistant = common::test_assistant(provider.clone());

    assistant
        .handle(&ChatRequest::new("start a timer then go to the next step"))
        .await
        .unwrap();
    assert_eq!(provider.schemas_called(), vec!["moderation_verdict", "set_timer"]);
}

#[tokio::test]
async fn test_substitution_request_modifies_recipe() {
    let provider = Arc::new(ScriptedProvider::new().allowing().with_object(
        "modify_recipe",
        json!({
            "modificationType": "ingredient",
            "target": "butter",
            "newValue": "olive oil",
            "reason": "Olive oil works well for sauteing."
        }),
    ));
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("Can I use olive oil instead of butter?"))
        .await
        .unwrap();

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value["modificationAction"],
        json!({
            "type": "ingredient",
            "target": "butter",
            "newValue": "olive oil",
            "reason": "Olive oil works well for sauteing."
        })
    );
    assert_eq!(response.response, "Olive oil works well for sauteing.");
}

#[tokio::test]
async fn test_prep_request_lists_generated_suggestions() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object(
                "get_prep_work",
                json!({"prepType": "ingredients", "focus": "vegetables"}),
            )
            .with_text(TextCall::PrepSuggestions, "1. Dice the onions\n\n2) Mince the garlic\n"),
    );
    let assistant = common::test_assistant(provider.clone());

    let mut request = ChatRequest::new("What do I need to prep?");
    request.recipe_name = Some("Ratatouille".to_owned());
    let response = assistant.handle(&request).await.unwrap();

    assert_eq!(
        response.response,
        "Here's what you need to prepare: Dice the onions, Mince the garlic"
    );
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value["prepWorkAction"],
        json!({
            "type": "ingredients",
            "focus": "vegetables",
            "suggestions": ["Dice the onions", "Mince the garlic"]
        })
    );

    let suggestion_call = provider
        .calls()
        .into_iter()
        .find(|c| c.text_call == Some(TextCall::PrepSuggestions))
        .unwrap();
    assert!(suggestion_call.system.contains("Ratatouille"));
    assert!(suggestion_call.system.contains("vegetables"));
}

#[tokio::test]
async fn test_prep_suggestion_failure_uses_defaults() {
    let provider = Arc::new(ScriptedProvider::new().allowing().with_object(
        "get_prep_work",
        json!({"prepType": "equipment", "focus": "pans"}),
    ));
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("help me get ready"))
        .await
        .unwrap();

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value["prepWorkAction"]["suggestions"],
        json!(DEFAULT_PREP_SUGGESTIONS)
    );
}

#[tokio::test]
async fn test_voice_timing_request_uses_short_lead_and_defaults() {
    let provider = Arc::new(ScriptedProvider::new().allowing().with_object(
        "get_timing_suggestions",
        json!({"timingType": "resting", "context": "roast chicken"}),
    ));
    let assistant = common::test_assistant(provider);

    let mut request = ChatRequest::new("How long should the chicken rest?");
    request.is_voice_command = true;
    let response = assistant.handle(&request).await.unwrap();

    assert_eq!(
        response.response,
        format!("Here's the timing: {}", DEFAULT_TIMING_SUGGESTIONS.join(", "))
    );
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["timingAction"]["type"], "resting");
    assert_eq!(value["timingAction"]["context"], "roast chicken");
}

#[tokio::test]
async fn test_typed_timing_request_uses_long_lead() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_object(
                "get_timing_suggestions",
                json!({"timingType": "overall", "context": "dinner"}),
            )
            .with_text(TextCall::TimingSuggestions, "Start the rice first\nSear the fish last"),
    );
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("When should I start the fish?"))
        .await
        .unwrap();
    assert_eq!(
        response.response,
        "Here's the timing guidance: Start the rice first, Sear the fish last"
    );
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_unclassified_message_goes_straight_to_fallback() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_text(TextCall::Fallback, "  A dry white wine is lovely with risotto.  "),
    );
    let assistant = common::test_assistant(provider.clone());

    let response = assistant
        .handle(&ChatRequest::new("What wine pairs with risotto?"))
        .await
        .unwrap();

    assert_eq!(response.response, "A dry white wine is lovely with risotto.");
    assert_fallback_shape(&response);
    assert_eq!(provider.schemas_called(), vec!["moderation_verdict"]);
}

#[tokio::test]
async fn test_blank_fallback_text_is_replaced() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_text(TextCall::Fallback, "   "),
    );
    let assistant = common::test_assistant(provider);

    let response = assistant
        .handle(&ChatRequest::new("Tell me about saffron"))
        .await
        .unwrap();
    assert_eq!(response.response, EMPTY_FALLBACK_REPLY);
}

#[tokio::test]
async fn test_fallback_prompt_carries_recent_history() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_text(TextCall::Fallback, "Yes, keep stirring."),
    );
    let assistant = common::test_assistant(provider.clone());

    let mut request = ChatRequest::new("Is it thick enough?");
    request.conversation_history = (0..12)
        .map(|i| {
            let role = if i % 2 == 0 {
                HistoryRole::User
            } else {
                HistoryRole::Assistant
            };
            HistoryEntry::new(role, format!("turn-{i:02}"))
        })
        .collect();
    assistant.handle(&request).await.unwrap();

    let fallback = provider
        .calls()
        .into_iter()
        .find(|c| c.text_call == Some(TextCall::Fallback))
        .unwrap();
    assert!(!fallback.user.contains("turn-01"));
    assert!(fallback.user.contains("turn-02"));
    assert!(fallback.user.contains("turn-11"));
    assert!(fallback.user.ends_with("User: Is it thick enough?"));
}

#[tokio::test]
async fn test_degraded_service_gives_identical_fallback_shapes() {
    let provider = Arc::new(
        ScriptedProvider::new().with_text(TextCall::Fallback, "Let's keep cooking."),
    );
    let assistant = common::test_assistant(provider);
    let request = ChatRequest::new("Set a timer for 10 minutes for the pasta");

    let first = assistant.handle(&request).await.unwrap();
    let second = assistant.handle(&request).await.unwrap();

    assert_eq!(first, second);
    assert_fallback_shape(&first);
}

#[tokio::test]
async fn test_fallback_failure_is_an_error() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = common::test_assistant(provider.clone());

    let error = assistant
        .handle(&ChatRequest::new("What wine pairs with risotto?"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);
    assert_eq!(provider.text_calls(), vec![TextCall::Fallback]);
}

#[tokio::test]
async fn test_stalled_service_is_bounded_by_request_budget() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_structured("moderation_verdict", Reply::Stall)
            .with_text_reply(TextCall::Fallback, Reply::Stall),
    );
    let assistant =
        mise_chat::assistant::CookingAssistant::new(provider.clone(), Duration::from_millis(150));

    let started = Instant::now();
    let error = assistant
        .handle(&ChatRequest::new("set a timer for 5 minutes"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalTimeout);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_stalled_moderation_fails_open_and_timer_still_runs() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_structured("moderation_verdict", Reply::Stall)
            .with_object("set_timer", pasta_timer())
            .with_text(TextCall::Fallback, "Unused."),
    );
    let assistant =
        mise_chat::assistant::CookingAssistant::new(provider.clone(), Duration::from_millis(400));

    let response = assistant
        .handle(&ChatRequest::new("set a timer for 10 minutes for the pasta"))
        .await
        .unwrap();

    assert_eq!(present_actions(&response), vec!["timerAction"]);
    assert!(provider.text_calls().is_empty());
}

#[tokio::test]
async fn test_stalled_tool_falls_back_instead_of_failing() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .allowing()
            .with_structured("set_timer", Reply::Stall)
            .with_text(TextCall::Fallback, "Boil the pasta for about ten minutes."),
    );
    let assistant =
        mise_chat::assistant::CookingAssistant::new(provider.clone(), Duration::from_millis(400));

    let response = assistant
        .handle(&ChatRequest::new("set a timer for 10 minutes for the pasta"))
        .await
        .unwrap();

    assert_eq!(response.response, "Boil the pasta for about ten minutes.");
    assert_fallback_shape(&response);
}

#[tokio::test]
async fn test_stalled_moderation_and_tool_still_reach_fallback() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_structured("moderation_verdict", Reply::Stall)
            .with_structured("set_timer", Reply::Stall)
            .with_text(TextCall::Fallback, "Let's keep an eye on it together."),
    );
    let assistant =
        mise_chat::assistant::CookingAssistant::new(provider.clone(), Duration::from_millis(400));

    let response = assistant
        .handle(&ChatRequest::new("set a timer for 10 minutes"))
        .await
        .unwrap();

    assert_eq!(response.response, "Let's keep an eye on it together.");
    assert_fallback_shape(&response);
}

#[tokio::test]
async fn test_calls_use_per_intent_budgets() {
    let provider = Arc::new(
        ScriptedProvider::new().allowing().with_object(
            "modify_recipe",
            json!({
                "modificationType": "time",
                "target": "step 2",
                "newValue": "15 minutes",
                "reason": "Thicker cuts need longer."
            }),
        ),
    );
    let assistant = common::test_assistant(provider.clone());

    assistant
        .handle(&ChatRequest::new("modify the cooking time"))
        .await
        .unwrap();

    let calls = provider.calls();
    assert_eq!(calls[0].temperature, Some(0.1));
    assert_eq!(calls[1].schema, Some("modify_recipe"));
    assert_eq!(calls[1].temperature, Some(0.3));
    assert_eq!(calls[1].max_tokens, Some(300));
}
