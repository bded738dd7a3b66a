// ABOUTME: Route handlers for the cooking chat, step tips, and ingredient substitution endpoints
// ABOUTME: Parses bodies into typed requests, delegates to the assistant, and maps errors to HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Cooking chat routes
//!
//! Bodies are taken as raw JSON first and deserialized here, so malformed JSON
//! and schema mismatches both produce this service's own
//! `{error: "Invalid request", details}` 400 body. A body that overruns the
//! size limit while being read is still a 413.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::assistant::{ChatRequest, StepTipsRequest, SubstitutionRequest};
use crate::constants::error_messages;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::resources::ServerResources;

/// Body of a step tips reply
#[derive(Debug, Serialize)]
struct StepTipsResponse {
    suggestions: Vec<String>,
}

/// Body of a substitutions reply
#[derive(Debug, Serialize)]
struct SubstitutionsResponse {
    substitutions: Vec<String>,
}

/// Cooking chat routes implementation
pub struct CookingChatRoutes;

impl CookingChatRoutes {
    /// Create all cooking chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/cooking-chat", post(Self::chat))
            .route("/api/cooking-chat/suggestions", post(Self::step_tips))
            .route("/api/cooking-chat/substitutions", post(Self::substitutions))
            .with_state(resources)
    }

    /// Deserialize a JSON body into a typed request
    fn parse_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> AppResult<T> {
        let Json(value) = body.map_err(|rejection| {
            // Bodies without a content-length only hit the limit while buffering
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return AppError::new(ErrorCode::PayloadTooLarge, error_messages::BODY_TOO_LARGE);
            }
            AppError::new(ErrorCode::InvalidFormat, error_messages::INVALID_REQUEST)
                .with_details(json!({ "message": rejection.body_text() }))
        })?;

        serde_json::from_value(value).map_err(|e| {
            AppError::new(ErrorCode::InvalidInput, error_messages::INVALID_REQUEST)
                .with_details(json!({ "message": e.to_string() }))
        })
    }

    /// Render a handler result, hiding internal errors behind `public_message`
    fn respond<T: Serialize>(
        result: AppResult<T>,
        public_message: &str,
        resources: &ServerResources,
    ) -> Response {
        match result {
            Ok(body) => Json(body).into_response(),
            Err(e) => {
                if !e.code.is_client_error() {
                    error!(code = ?e.code, error = %e, "{public_message}");
                }
                e.into_public_response(public_message, resources.exposes_error_details())
            }
        }
    }

    async fn chat(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Response {
        let result = match Self::parse_body::<ChatRequest>(body) {
            Ok(request) => resources.assistant.handle(&request).await,
            Err(e) => Err(e),
        };
        Self::respond(result, error_messages::CHAT_FAILED, &resources)
    }

    async fn step_tips(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Response {
        let result = match Self::parse_body::<StepTipsRequest>(body) {
            Ok(request) => resources
                .assistant
                .step_tips(&request)
                .await
                .map(|suggestions| StepTipsResponse { suggestions }),
            Err(e) => Err(e),
        };
        Self::respond(result, error_messages::SUGGESTIONS_FAILED, &resources)
    }

    async fn substitutions(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Response {
        let result = match Self::parse_body::<SubstitutionRequest>(body) {
            Ok(request) => resources
                .assistant
                .substitutions(&request)
                .await
                .map(|substitutions| SubstitutionsResponse { substitutions }),
            Err(e) => Err(e),
        };
        Self::respond(result, error_messages::SUBSTITUTIONS_FAILED, &resources)
    }
}
