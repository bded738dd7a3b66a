// ABOUTME: CORS middleware configuration for the cooking chat HTTP API
// ABOUTME: Builds a tower-http CorsLayer from the configured origin list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Configure CORS for the browser and mobile clients
///
/// `CORS_ALLOWED_ORIGINS` is either `*` (any origin) or a comma-separated
/// origin list. An empty or unparseable list falls back to any origin.
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://mise.example.com,https://staging.mise.example.com"
/// ```
pub fn setup_cors(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.is_empty() || config.allowed_origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
