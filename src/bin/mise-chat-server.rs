// ABOUTME: Server binary for the Mise cooking chat service
// ABOUTME: Loads environment configuration, initializes logging and the LLM provider, then serves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Mise Cooking Chat Server Binary

use anyhow::Result;
use clap::Parser;
use mise_chat::{
    config::ServerConfig, llm::LlmProvider, llm::OpenAiCompatibleProvider, logging,
    resources::ServerResources, server,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mise-chat-server")]
#[command(about = "Mise cooking assistant - conversational help during cooking sessions")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    logging::init_from_env()?;

    info!("Starting Mise cooking chat");
    info!("{}", config.summary());

    let provider = OpenAiCompatibleProvider::from_env()?;
    info!(
        "Generation provider ready: {} (model {})",
        provider.name(),
        provider.default_model()
    );

    let resources = Arc::new(ServerResources::new(Arc::new(provider), config));

    if let Err(e) = server::serve(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
