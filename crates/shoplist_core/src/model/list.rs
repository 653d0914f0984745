//! Shopping list record.
//!
//! # Invariants
//! - `sort_order` is unique among all lists after every mutation.
//! - At most one list has `is_active = true`; once any list exists exactly
//!   one does.

use super::CompletionStats;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ListId = Uuid;

/// Icon assigned when a list is created without one.
pub const DEFAULT_LIST_ICON: &str = "🛒";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub uuid: ListId,
    pub name: String,
    pub icon: String,
    pub sort_order: i64,
    pub is_active: bool,
    /// Epoch seconds.
    pub created_at: i64,
    /// Epoch seconds.
    pub updated_at: i64,
}

/// List plus its completion counters, as shown on the overview screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    #[serde(flatten)]
    pub list: ShoppingList,
    pub stats: CompletionStats,
}
