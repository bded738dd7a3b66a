// ABOUTME: Cooking assistant core: moderation, intent routing, tool dispatch, and fallback
// ABOUTME: Everything here is request-scoped; no state survives between calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Cooking Assistant
//!
//! Entry point is [`CookingAssistant::handle`]. The submodules are the
//! pipeline's stages, leaves first.

/// Bounded prompt context from prior turns
pub mod context;
/// Per-request wall-clock budget
pub mod deadline;
/// Free-form fallback reply
pub mod fallback;
/// Ordered keyword classifier
pub mod intent;
/// Content moderation gate
pub mod moderation;
/// Stage machine tying the pipeline together
pub mod pipeline;
/// Response envelope and builders
pub mod response;
/// Suggestion list generators
pub mod suggestions;
/// Structured tool calls and their results
pub mod tools;
/// Request bodies
pub mod types;

pub use intent::{classify, Intent};
pub use moderation::ModerationVerdict;
pub use pipeline::{CookingAssistant, FallbackReason, PipelineStage};
pub use response::{ChatResponse, ResponseAction};
pub use tools::{ToolFailure, ToolResult};
pub use types::{ChatRequest, HistoryEntry, HistoryRole, StepTipsRequest, SubstitutionRequest};
