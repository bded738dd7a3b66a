// ABOUTME: Tracing subscriber setup for the cooking chat service
// ABOUTME: Chooses json, pretty, or compact output and quiets HTTP client noise by default
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! Pipeline code logs with structured fields (`intent`, `stage`,
//! `fallback_reason`, `request_id`); the format chosen here only decides how
//! those fields are rendered.

use crate::config::types::Environment;
use crate::constants::{env_vars, service_names};
use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Directives appended to every filter so dependency chatter stays at warn
const QUIET_DEPENDENCIES: [&str; 3] = ["hyper=warn", "reqwest=warn", "h2=warn"];

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shipping
    Json,
    /// Multi-field human output for local development
    Pretty,
    /// Single-line output
    Compact,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value
    ///
    /// Unknown values fall back to JSON in production and pretty elsewhere.
    #[must_use]
    pub fn parse(value: Option<&str>, environment: Environment) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ if environment.is_production() => Self::Json,
            _ => Self::Pretty,
        }
    }

    /// Lowercase name for the startup log
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base filter directive, `RUST_LOG` syntax
    pub filter: String,
    /// Output format
    pub format: LogFormat,
    /// Deployment environment
    pub environment: Environment,
    /// Include source file and line
    pub include_location: bool,
    /// Emit span open/close events (one per pipeline request)
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Pretty,
            environment: Environment::Development,
            include_location: false,
            include_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `ENVIRONMENT`/`NODE_ENV`, and the
    /// `LOG_INCLUDE_*` switches
    #[must_use]
    pub fn from_env() -> Self {
        let environment = Environment::from_str_or_default(
            &env::var(env_vars::ENVIRONMENT)
                .or_else(|_| env::var(env_vars::NODE_ENV))
                .unwrap_or_default(),
        );

        Self {
            filter: env::var(env_vars::RUST_LOG).unwrap_or_else(|_| "info".to_owned()),
            format: LogFormat::parse(env::var(env_vars::LOG_FORMAT).ok().as_deref(), environment),
            environment,
            include_location: environment.is_production()
                || env::var(env_vars::LOG_INCLUDE_LOCATION).is_ok(),
            include_spans: env::var(env_vars::LOG_INCLUDE_SPANS).is_ok(),
        }
    }

    /// Filter directives in the order they are applied
    #[must_use]
    pub fn directives(&self) -> Vec<String> {
        let mut directives: Vec<String> = QUIET_DEPENDENCIES
            .iter()
            .map(|d| (*d).to_owned())
            .collect();
        if !self.filter.contains("tower_http") {
            directives.push("tower_http=info".to_owned());
        }
        directives
    }

    fn env_filter(&self) -> EnvFilter {
        self.directives()
            .iter()
            .filter_map(|d| d.parse().ok())
            .fold(EnvFilter::new(&self.filter), EnvFilter::add_directive)
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_writer(io::stdout)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Json => layer.json().with_current_span(true).boxed(),
            LogFormat::Pretty => layer.with_target(true).boxed(),
            LogFormat::Compact => layer.compact().with_target(false).boxed(),
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed
    pub fn init(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(self.env_filter())
            .try_init()?;

        info!(
            service.name = service_names::MISE_COOKING_CHAT,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.filter = %self.filter,
            log.format = self.format.as_str(),
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}
