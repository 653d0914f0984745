//! Item use-case service.
//!
//! # Responsibility
//! - Validate item names and descriptions.
//! - Expose item flags and every ordering entry point for items.
//!
//! # Invariants
//! - Creation always records the trimmed name in history.

use super::error::{
    normalize_name, normalize_text, ServiceResult, DESCRIPTION_MAX_CHARS, ITEM_NAME_MAX_CHARS,
};
use crate::model::item::{Item, ItemId};
use crate::model::list::ListId;
use crate::model::section::SectionId;
use crate::ordering::{MoveDirection, MoveOutcome};
use crate::repo::ItemRepository;

/// Item service facade over repository implementations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_item(
        &self,
        section_uuid: SectionId,
        name: &str,
        description: &str,
    ) -> ServiceResult<Item> {
        let name = normalize_name("item name", name, ITEM_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self.repo.create_item(section_uuid, &name, &description)?)
    }

    pub fn update_item(
        &self,
        item_uuid: ItemId,
        name: &str,
        description: &str,
    ) -> ServiceResult<Item> {
        let name = normalize_name("item name", name, ITEM_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self.repo.update_item(item_uuid, &name, &description)?)
    }

    pub fn delete_item(&self, item_uuid: ItemId) -> ServiceResult<()> {
        Ok(self.repo.delete_item(item_uuid)?)
    }

    pub fn delete_completed_items(&self, list_uuid: ListId) -> ServiceResult<usize> {
        Ok(self.repo.delete_completed_items(list_uuid)?)
    }

    pub fn get_item(&self, item_uuid: ItemId) -> ServiceResult<Option<Item>> {
        Ok(self.repo.get_item(item_uuid)?)
    }

    pub fn list_items(&self, section_uuid: SectionId) -> ServiceResult<Vec<Item>> {
        Ok(self.repo.list_items(section_uuid)?)
    }

    pub fn toggle_completed(&self, item_uuid: ItemId) -> ServiceResult<Item> {
        Ok(self.repo.toggle_completed(item_uuid)?)
    }

    pub fn toggle_uncertain(&self, item_uuid: ItemId) -> ServiceResult<Item> {
        Ok(self.repo.toggle_uncertain(item_uuid)?)
    }

    pub fn move_item(
        &self,
        item_uuid: ItemId,
        direction: MoveDirection,
    ) -> ServiceResult<MoveOutcome> {
        Ok(self.repo.move_item(item_uuid, direction)?)
    }

    pub fn move_item_to_section(
        &self,
        item_uuid: ItemId,
        section_uuid: SectionId,
    ) -> ServiceResult<Item> {
        Ok(self.repo.move_item_to_section(item_uuid, section_uuid)?)
    }

    /// `position` is clamped into the destination's incomplete items.
    pub fn move_item_to_section_at(
        &self,
        item_uuid: ItemId,
        section_uuid: SectionId,
        position: i64,
    ) -> ServiceResult<Item> {
        Ok(self
            .repo
            .move_item_to_section_at(item_uuid, section_uuid, position)?)
    }

    pub fn reorder_item(&self, item_uuid: ItemId, position: i64) -> ServiceResult<Item> {
        Ok(self.repo.reorder_item(item_uuid, position)?)
    }
}
