// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request ID generation, per-request spans, and the CORS layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS layer construction
pub mod cors;
/// Request ids and request spans
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::{create_request_span, MakeRequestUuid, REQUEST_ID_HEADER};
