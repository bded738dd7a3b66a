// ABOUTME: Per-request wall-clock budget shared by every generation call of one request
// ABOUTME: Wraps futures in tokio timeouts sized to whatever budget remains
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout, Instant};

use crate::constants::assistant::STAGE_CALL_SHARE;
use crate::errors::{AppError, AppResult};

/// Which slice of the request budget a call may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Moderation, tool, and suggestion calls. Each is capped at a fixed share
    /// of the budget and never eats into the share held back for the last call.
    Stage,
    /// The call that ends the request (fallback reply, tips, substitutions).
    /// It may use everything that is left.
    Final,
}

/// Wall-clock budget for one request
///
/// Stages run sequentially. A stalled stage call times out after its own cap,
/// so the degradation path after it (fail open, fall back) still has time to
/// run. Exceeding a cap surfaces as an `ExternalTimeout` error, which callers
/// handle like any other call failure.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline {
    expires_at: Instant,
    stage_cap: Duration,
}

impl RequestDeadline {
    /// Start a budget of `budget` from now
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
            stage_cap: budget / STAGE_CALL_SHARE,
        }
    }

    /// Time left before the deadline
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Whether the budget is used up
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Longest a call of `kind` may run from now
    #[must_use]
    pub fn allowance(&self, kind: CallKind) -> Duration {
        let remaining = self.remaining();
        match kind {
            CallKind::Stage => remaining
                .saturating_sub(self.stage_cap)
                .min(self.stage_cap),
            CallKind::Final => remaining,
        }
    }

    /// Run `operation` within its allowance
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or an `ExternalTimeout` error if the
    /// allowance runs out first
    pub async fn run<F, T>(&self, kind: CallKind, operation: &str, future: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let allowance = self.allowance(kind);
        if allowance.is_zero() {
            return Err(AppError::timeout(operation));
        }

        timeout(allowance, future)
            .await
            .map_or_else(|_| Err(AppError::timeout(operation)), |result| result)
    }
}
