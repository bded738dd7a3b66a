// ABOUTME: Shared test setup for the cooking chat integration tests
// ABOUTME: Provides quiet logging and router/assistant builders over a scripted provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `mise_chat`

use axum::Router;
use mise_chat::{
    assistant::CookingAssistant,
    config::{Environment, ServerConfig},
    llm::LlmProvider,
    resources::ServerResources,
    server,
};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Server configuration used by tests
pub fn test_config(environment: Environment) -> ServerConfig {
    ServerConfig {
        environment,
        request_timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    }
}

/// Full router over `provider`, as the binary would build it
pub fn test_router(provider: Arc<dyn LlmProvider>, environment: Environment) -> Router {
    init_test_logging();
    let resources = Arc::new(ServerResources::new(provider, test_config(environment)));
    server::build_router(resources)
}

/// Router with a custom per-request budget
pub fn test_router_with_timeout(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Router {
    init_test_logging();
    let config = ServerConfig {
        request_timeout: timeout,
        ..test_config(Environment::Testing)
    };
    server::build_router(Arc::new(ServerResources::new(provider, config)))
}

/// Assistant over `provider` with the test budget
pub fn test_assistant(provider: Arc<dyn LlmProvider>) -> CookingAssistant {
    init_test_logging();
    CookingAssistant::new(provider, Duration::from_secs(5))
}
