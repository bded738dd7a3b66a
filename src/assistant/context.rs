// ABOUTME: Builds the bounded prompt context from prior turns and the new message
// ABOUTME: Pure function over request data; nothing is stored between requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::types::HistoryEntry;
use crate::constants::assistant::HISTORY_WINDOW;

/// Flatten the most recent history plus the new message into one prompt string
///
/// Only the last [`HISTORY_WINDOW`] entries are kept. With no history the
/// message is returned as-is.
#[must_use]
pub fn build_conversation_context(history: &[HistoryEntry], message: &str) -> String {
    if history.is_empty() {
        return message.to_owned();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let lines = history[start..]
        .iter()
        .map(|entry| format!("{}: {}", entry.role.as_str(), entry.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{lines}\n\nUser: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::types::HistoryRole;

    #[test]
    fn test_empty_history_returns_message() {
        assert_eq!(build_conversation_context(&[], "what's next?"), "what's next?");
    }

    #[test]
    fn test_history_lines_precede_message() {
        let history = vec![
            HistoryEntry::new(HistoryRole::User, "start the sauce"),
            HistoryEntry::new(HistoryRole::Assistant, "Melt the butter first."),
        ];
        let context = build_conversation_context(&history, "done, now what?");
        assert_eq!(
            context,
            "user: start the sauce\nassistant: Melt the butter first.\n\nUser: done, now what?"
        );
    }

    #[test]
    fn test_only_last_ten_entries_kept() {
        let history: Vec<_> = (0..15)
            .map(|i| HistoryEntry::new(HistoryRole::User, format!("turn {i}")))
            .collect();
        let context = build_conversation_context(&history, "latest");

        assert!(!context.contains("turn 4\n"));
        assert!(context.starts_with("user: turn 5\n"));
        assert!(context.contains("user: turn 14\n\nUser: latest"));
        assert_eq!(context.lines().filter(|l| l.starts_with("user: ")).count(), 10);
    }
}
