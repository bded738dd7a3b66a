// ABOUTME: Shared test helpers for the cooking chat integration tests
// ABOUTME: Exports the in-process HTTP driver and the scripted generation provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod axum_test;
pub mod mock_llm;
