//! Domain model for lists, sections, items, history and templates.
//!
//! # Responsibility
//! - Define the records returned by repositories and services.
//! - Name every entity kind so errors can say what was missing.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - `sort_order` is only meaningful inside one sibling group.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod history;
pub mod item;
pub mod list;
pub mod section;
pub mod template;

/// Entity categories known to the core, used in not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    List,
    Section,
    Item,
    HistoryEntry,
    Template,
    TemplateItem,
}

impl EntityKind {
    /// Stable lowercase label used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Section => "section",
            Self::Item => "item",
            Self::HistoryEntry => "history entry",
            Self::Template => "template",
            Self::TemplateItem => "template item",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion counters for one list or one section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub total_items: i64,
    pub completed_items: i64,
    /// Integer floor of `completed_items * 100 / total_items`; `0` when empty.
    pub percentage: i64,
}

impl CompletionStats {
    pub fn from_counts(total_items: i64, completed_items: i64) -> Self {
        let percentage = if total_items > 0 {
            completed_items * 100 / total_items
        } else {
            0
        };
        Self {
            total_items,
            completed_items,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompletionStats;

    #[test]
    fn percentage_floors_and_handles_empty() {
        assert_eq!(CompletionStats::from_counts(0, 0).percentage, 0);
        assert_eq!(CompletionStats::from_counts(3, 1).percentage, 33);
        assert_eq!(CompletionStats::from_counts(4, 4).percentage, 100);
    }
}
