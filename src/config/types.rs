// ABOUTME: Shared configuration type definitions for the cooking assistant server
// ABOUTME: Contains the Environment enum used by logging, error rendering, and startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment (default)
    #[default]
    Development,
    /// Production environment; internal error details are never exposed
    Production,
    /// Testing environment for automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development, // Default fallback (including "development" | "dev")
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether error responses may carry internal details
    #[must_use]
    pub const fn exposes_error_details(&self) -> bool {
        !self.is_production()
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("TEST"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("staging"),
            Environment::Development
        );
    }

    #[test]
    fn test_only_production_hides_details() {
        assert!(!Environment::Production.exposes_error_details());
        assert!(Environment::Development.exposes_error_details());
        assert!(Environment::Testing.exposes_error_details());
    }
}
