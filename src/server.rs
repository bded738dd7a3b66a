// ABOUTME: HTTP server assembly: router, tower-http layers, listener, and graceful shutdown
// ABOUTME: Shared by the binary and the integration tests so both exercise the same stack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{Context, Result};
use axum::{body::Body, http::Request, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::middleware::{create_request_span, setup_cors, MakeRequestUuid, REQUEST_ID_HEADER};
use crate::resources::ServerResources;
use crate::routes::{CookingChatRoutes, HealthRoutes};

/// Build the full application router with its middleware stack
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let request_id_header = http::HeaderName::from_static(REQUEST_ID_HEADER);
    let cors = setup_cors(&resources.config.cors);
    let body_limit = resources.config.max_body_bytes;

    Router::new()
        .merge(CookingChatRoutes::routes(Arc::clone(&resources)))
        .merge(HealthRoutes::routes(resources))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    request_id_header.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| create_request_span(request)),
                )
                .layer(PropagateRequestIdLayer::new(request_id_header))
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(cors),
        )
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound, or
/// the server fails while running
pub async fn serve(resources: Arc<ServerResources>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", resources.config.host, resources.config.http_port)
        .parse()
        .context("Invalid HOST/HTTP_PORT combination")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Cooking chat server listening on http://{addr}");
    display_available_endpoints(addr);

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Cooking chat server stopped");
    Ok(())
}

fn display_available_endpoints(addr: SocketAddr) {
    info!("=== Available API Endpoints ===");
    info!("  POST http://{addr}/api/cooking-chat");
    info!("  POST http://{addr}/api/cooking-chat/suggestions");
    info!("  POST http://{addr}/api/cooking-chat/substitutions");
    info!("  GET  http://{addr}/health");
    info!("  GET  http://{addr}/ready");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
