// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads server port, request budget, CORS origins, and environment mode from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration for the cooking assistant server.
//!
//! Configuration is environment-only; there is no config file. LLM connection
//! settings are read by the provider itself (see [`crate::llm`]).

use crate::config::types::Environment;
use crate::constants::{defaults, env_vars};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*`
    pub allowed_origins: String,
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Wall-clock budget for one assistant request, shared by all its generation calls
    pub request_timeout: Duration,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            environment: Environment::default(),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            max_body_bytes: defaults::MAX_BODY_BYTES,
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed, or
    /// if the request budget is zero
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var(env_vars::ENVIRONMENT)
                .or_else(|_| env::var(env_vars::NODE_ENV))
                .unwrap_or_else(|_| "development".to_owned()),
        );

        let request_timeout_secs: u64 = env_var_or(
            env_vars::REQUEST_TIMEOUT_SECS,
            &defaults::REQUEST_TIMEOUT_SECS.to_string(),
        )
        .parse()
        .context("Invalid MISE_REQUEST_TIMEOUT_SECS value")?;
        if request_timeout_secs == 0 {
            bail!("MISE_REQUEST_TIMEOUT_SECS must be at least 1 second");
        }

        Ok(Self {
            host: env_var_or(env_vars::HOST, defaults::HOST),
            http_port: env_var_or(env_vars::HTTP_PORT, &defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment,
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_body_bytes: env_var_or(
                env_vars::MAX_BODY_BYTES,
                &defaults::MAX_BODY_BYTES.to_string(),
            )
            .parse()
            .context("Invalid MISE_MAX_BODY_BYTES value")?,
            cors: CorsConfig {
                allowed_origins: env_var_or(env_vars::CORS_ALLOWED_ORIGINS, "*"),
            },
        })
    }

    /// Human-readable configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Mise Cooking Chat Configuration:\n\
             - Bind: {}:{}\n\
             - Environment: {}\n\
             - Request Budget: {}s\n\
             - Max Body: {} bytes\n\
             - CORS Origins: {}",
            self.host,
            self.http_port,
            self.environment,
            self.request_timeout.as_secs(),
            self.max_body_bytes,
            self.cors.allowed_origins,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
