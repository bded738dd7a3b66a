// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness reports the process; readiness also probes the generation service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health))
            .route("/ready", get(Self::ready))
            .with_state(resources)
    }

    async fn health() -> Json<serde_json::Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::MISE_COOKING_CHAT,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn ready(State(resources): State<Arc<ServerResources>>) -> Response {
        let provider = resources.assistant.provider_name();
        let reachable = match resources.assistant.health_check().await {
            Ok(reachable) => reachable,
            Err(e) => {
                warn!(provider, error = %e, "Readiness probe failed");
                false
            }
        };

        let status = if reachable {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            status,
            Json(json!({
                "status": if reachable { "ready" } else { "degraded" },
                "llm": { "provider": provider, "reachable": reachable },
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response()
    }
}
