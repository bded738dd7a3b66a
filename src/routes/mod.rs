// ABOUTME: Route module organization for the Mise cooking chat HTTP endpoints
// ABOUTME: Each domain module holds route definitions and thin handlers over the assistant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the cooking chat server

/// Cooking chat, step tips, and substitution routes
pub mod cooking_chat;
/// Health check and readiness routes
pub mod health;

pub use cooking_chat::CookingChatRoutes;
pub use health::HealthRoutes;
