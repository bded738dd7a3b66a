// ABOUTME: Shared server resources handed to every route handler
// ABOUTME: Bundles the cooking assistant with the loaded server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use crate::assistant::CookingAssistant;
use crate::config::ServerConfig;
use crate::llm::LlmProvider;

/// Resources shared across handlers, created once at startup
///
/// Nothing in here is mutated after construction; requests share no state.
pub struct ServerResources {
    /// The assistant pipeline
    pub assistant: CookingAssistant,
    /// Loaded server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Build resources over a generation provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: ServerConfig) -> Self {
        let assistant = CookingAssistant::new(provider, config.request_timeout);
        Self {
            assistant,
            config: Arc::new(config),
        }
    }

    /// Whether 500 bodies may carry error details
    #[must_use]
    pub fn exposes_error_details(&self) -> bool {
        self.config.environment.exposes_error_details()
    }
}
