// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Generates `x-request-id` values and builds one span per HTTP request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates `req_<uuid>` request ids for requests that arrive without one
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&format!("req_{}", Uuid::new_v4().simple()))
            .ok()
            .map(RequestId::new)
    }
}

/// Create a tracing span for an HTTP request
///
/// The request id is read from the header set by the request-id layer, which
/// runs before this span is created.
#[must_use]
pub fn create_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
