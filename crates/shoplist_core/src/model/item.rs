//! Item record.
//!
//! # Invariants
//! - Display order inside a section is `completed ASC, sort_order ASC`, so a
//!   completed item may share a `sort_order` with an incomplete one.

use super::section::SectionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ItemId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uuid: ItemId,
    pub section_uuid: SectionId,
    pub name: String,
    pub description: String,
    pub completed: bool,
    /// User is unsure whether the item is needed.
    pub uncertain: bool,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Item {
    /// Whether this item takes part in positional reordering.
    pub fn is_positional(&self) -> bool {
        !self.completed
    }
}
