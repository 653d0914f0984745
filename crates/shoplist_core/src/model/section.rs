//! Section record and the section/item tree read model.

use super::item::Item;
use super::list::{ListId, ShoppingList};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SectionId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub uuid: SectionId,
    pub list_uuid: ListId,
    pub name: String,
    /// Unique within the owning list.
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Section with its items in display order (incomplete first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionWithItems {
    #[serde(flatten)]
    pub section: Section,
    pub items: Vec<Item>,
}

/// Full read model for one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTree {
    pub list: ShoppingList,
    pub sections: Vec<SectionWithItems>,
}
