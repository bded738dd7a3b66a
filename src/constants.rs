// ABOUTME: System-wide constants for the Mise cooking assistant
// ABOUTME: Holds env var names, server defaults, generation budgets, and fixed reply text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded values shared across the crate. Generation budgets live here so the
//! per-intent tuning is visible in one place.

/// Service identity used in structured logs
pub mod service_names {
    /// Service name reported in startup logs
    pub const MISE_COOKING_CHAT: &str = "mise-cooking-chat";
}

/// Environment variable names
pub mod env_vars {
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Deployment environment, Node-style alias
    pub const NODE_ENV: &str = "NODE_ENV";
    /// HTTP port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Bind host
    pub const HOST: &str = "HOST";
    /// Per-request wall-clock budget in seconds
    pub const REQUEST_TIMEOUT_SECS: &str = "MISE_REQUEST_TIMEOUT_SECS";
    /// Maximum request body size
    pub const MAX_BODY_BYTES: &str = "MISE_MAX_BODY_BYTES";
    /// CORS allowed origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Generation service base URL
    pub const LLM_BASE_URL: &str = "MISE_LLM_BASE_URL";
    /// Generation model
    pub const LLM_MODEL: &str = "MISE_LLM_MODEL";
    /// Provider label for logs and readiness, overriding the detected one
    pub const LLM_PROVIDER_NAME: &str = "MISE_LLM_PROVIDER_NAME";
    /// Generation service API key
    pub const LLM_API_KEY: &str = "MISE_LLM_API_KEY";
    /// `OpenAI` API key, used when `MISE_LLM_API_KEY` is unset
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Tracing filter directive
    pub const RUST_LOG: &str = "RUST_LOG";
    /// Log output format: json, pretty, compact
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    /// Include source locations in log events when set
    pub const LOG_INCLUDE_LOCATION: &str = "LOG_INCLUDE_LOCATION";
    /// Emit span open/close events when set
    pub const LOG_INCLUDE_SPANS: &str = "LOG_INCLUDE_SPANS";
}

/// Server defaults
pub mod defaults {
    /// Default bind host
    pub const HOST: &str = "127.0.0.1";
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8081;
    /// Request budget enforced around the assistant pipeline
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Maximum accepted JSON body
    pub const MAX_BODY_BYTES: usize = 64 * 1024;
    /// Default generation endpoint
    pub const LLM_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default generation model
    pub const LLM_MODEL: &str = "gpt-4o-mini";
}

/// Temperature and output budgets for each generation call
pub mod generation {
    /// Budget for one generation call
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct CallBudget {
        /// Sampling temperature
        pub temperature: f32,
        /// Maximum output tokens
        pub max_tokens: u32,
    }

    /// Content moderation
    pub const MODERATION: CallBudget = CallBudget {
        temperature: 0.1,
        max_tokens: 200,
    };
    /// Timer extraction
    pub const TIMER: CallBudget = CallBudget {
        temperature: 0.2,
        max_tokens: 200,
    };
    /// Step navigation extraction
    pub const NAVIGATE: CallBudget = CallBudget {
        temperature: 0.2,
        max_tokens: 200,
    };
    /// Recipe modification extraction
    pub const MODIFY: CallBudget = CallBudget {
        temperature: 0.3,
        max_tokens: 300,
    };
    /// Prep work extraction
    pub const PREP: CallBudget = CallBudget {
        temperature: 0.3,
        max_tokens: 200,
    };
    /// Timing guidance extraction
    pub const TIMING: CallBudget = CallBudget {
        temperature: 0.3,
        max_tokens: 200,
    };
    /// Prep and timing suggestion lists
    pub const SUGGESTIONS: CallBudget = CallBudget {
        temperature: 0.3,
        max_tokens: 200,
    };
    /// Free-form fallback reply
    pub const FALLBACK: CallBudget = CallBudget {
        temperature: 0.3,
        max_tokens: 300,
    };
    /// Per-step cooking tips
    pub const STEP_TIPS: CallBudget = CallBudget {
        temperature: 0.4,
        max_tokens: 200,
    };
    /// Ingredient substitutions
    pub const SUBSTITUTIONS: CallBudget = CallBudget {
        temperature: 0.3,
        max_tokens: 250,
    };
}

/// Fixed assistant text and limits
pub mod assistant {
    /// Number of prior turns kept in the prompt context
    pub const HISTORY_WINDOW: usize = 10;

    /// Moderation, tool, and suggestion calls each get at most
    /// `1 / STAGE_CALL_SHARE` of the request budget
    pub const STAGE_CALL_SHARE: u32 = 4;

    /// Context tag attached to fallback replies
    pub const FALLBACK_CONTEXT_TAG: &str = "cooking_assistance";

    /// Quick-action chips attached to fallback replies
    pub const FALLBACK_QUICK_ACTIONS: [&str; 5] = [
        "What's next?",
        "How long?",
        "Substitute?",
        "Help!",
        "Technique",
    ];

    /// Reply used when the fallback call succeeds but produces no text
    pub const EMPTY_FALLBACK_REPLY: &str =
        "I'm here to help with your cooking. Could you tell me a bit more about what you need?";

    /// Suggestions attached to a moderation rejection
    pub const REJECTION_SUGGESTIONS: [&str; 4] = [
        "Ask for a specific recipe",
        "Get cooking tips",
        "Learn about ingredients",
        "Get kitchen safety advice",
    ];

    /// Prep suggestions used when generation fails
    pub const DEFAULT_PREP_SUGGESTIONS: [&str; 3] = [
        "Gather all ingredients",
        "Prepare cooking equipment",
        "Read through the recipe",
    ];

    /// Timing suggestions used when generation fails
    pub const DEFAULT_TIMING_SUGGESTIONS: [&str; 3] = [
        "Start prep work early",
        "Monitor cooking times closely",
        "Allow for resting periods",
    ];

    /// Experience level assumed by the step tips endpoint
    pub const DEFAULT_EXPERIENCE_LEVEL: &str = "intermediate";

    /// Recipe context assumed by the substitutions endpoint
    pub const DEFAULT_RECIPE_CONTEXT: &str = "General cooking";

    /// Placeholder for absent prompt fields
    pub const NOT_SPECIFIED: &str = "Not specified";
}

/// Public error messages returned by the HTTP layer
pub mod error_messages {
    /// 500 body for the chat endpoint
    pub const CHAT_FAILED: &str = "Failed to process chat message";
    /// 500 body for the step tips endpoint
    pub const SUGGESTIONS_FAILED: &str = "Failed to generate suggestions";
    /// 500 body for the substitutions endpoint
    pub const SUBSTITUTIONS_FAILED: &str = "Failed to generate substitutions";
    /// 400 body for malformed JSON or schema failures
    pub const INVALID_REQUEST: &str = "Invalid request";
    /// 413 body when the request exceeds the body limit
    pub const BODY_TOO_LARGE: &str = "Request body too large";
}
