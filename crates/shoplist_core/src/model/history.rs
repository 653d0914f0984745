//! Item-name history used by autocomplete.
//!
//! History rows have their own lifecycle: deleting lists, sections or items
//! never removes them. A deleted section only clears `last_section_uuid`.

use super::section::SectionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type HistoryId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub uuid: HistoryId,
    /// Casing of the first use; identity is case-insensitive.
    pub name: String,
    pub last_section_uuid: Option<SectionId>,
    pub last_section_name: Option<String>,
    pub usage_count: i64,
    /// Epoch seconds.
    pub last_used_at: i64,
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub last_section_uuid: Option<SectionId>,
    pub last_section_name: Option<String>,
    pub usage_count: i64,
}

impl From<HistoryEntry> for Suggestion {
    fn from(value: HistoryEntry) -> Self {
        Self {
            name: value.name,
            last_section_uuid: value.last_section_uuid,
            last_section_name: value.last_section_name,
            usage_count: value.usage_count,
        }
    }
}
