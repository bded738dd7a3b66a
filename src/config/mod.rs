// ABOUTME: Configuration module for the cooking assistant server
// ABOUTME: Re-exports environment-driven server configuration and shared config types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration management

/// Environment-based server configuration
pub mod environment;
/// Shared configuration enums
pub mod types;

pub use environment::{CorsConfig, ServerConfig};
pub use types::Environment;
