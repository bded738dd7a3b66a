// ABOUTME: Main library entry point for the Mise cooking assistant chat service
// ABOUTME: Exposes the assistant pipeline, generation provider seam, and HTTP server assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Mise Cooking Chat
//!
//! Conversational help during a cooking session. Given a cook's utterance plus
//! the current recipe, step, and recent turns, the service decides what kind
//! of help is wanted and answers with either a structured action (start a
//! timer, move to a step, modify the recipe, prep or timing guidance) or a
//! free-form reply.
//!
//! ## Architecture
//!
//! - **assistant**: moderation gate, ordered intent classifier, one
//!   schema-constrained tool call per intent, fallback reply
//! - **llm**: the `LlmProvider` seam and an `OpenAI`-compatible client
//! - **routes** / **server**: axum handlers and the tower-http stack
//! - **config** / **logging** / **errors**: environment config, tracing
//!   setup, and the HTTP error envelope
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mise_chat::{config::ServerConfig, llm::OpenAiCompatibleProvider, resources::ServerResources};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let provider = Arc::new(OpenAiCompatibleProvider::from_env()?);
//!     let resources = Arc::new(ServerResources::new(provider, config));
//!     mise_chat::server::serve(resources).await
//! }
//! ```

/// Cooking assistant pipeline
pub mod assistant;

/// Configuration management
pub mod config;

/// Application constants and fixed reply text
pub mod constants;

/// Unified error handling
pub mod errors;

/// Generation service abstraction
pub mod llm;

/// Logging configuration and structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Shared handler resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Router assembly and serving
pub mod server;
