//! List use-case service.
//!
//! # Responsibility
//! - Validate list names and icons before persistence.
//! - Expose list lifecycle, activation and ordering entry points.

use super::error::{normalize_icon, normalize_name, ServiceResult, LIST_NAME_MAX_CHARS};
use crate::model::list::{ListId, ListSummary, ShoppingList};
use crate::model::CompletionStats;
use crate::ordering::{MoveDirection, MoveOutcome};
use crate::repo::ListRepository;

/// List service facade over repository implementations.
pub struct ListService<R: ListRepository> {
    repo: R,
}

impl<R: ListRepository> ListService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a list at the end; a blank icon becomes the default icon.
    pub fn create_list(&self, name: &str, icon: Option<&str>) -> ServiceResult<ShoppingList> {
        let name = normalize_name("list name", name, LIST_NAME_MAX_CHARS)?;
        let icon = normalize_icon(icon)?;
        Ok(self.repo.create_list(&name, &icon)?)
    }

    /// Renames a list. `icon = None` keeps the stored icon.
    pub fn update_list(
        &self,
        list_uuid: ListId,
        name: &str,
        icon: Option<&str>,
    ) -> ServiceResult<ShoppingList> {
        let name = normalize_name("list name", name, LIST_NAME_MAX_CHARS)?;
        let icon = icon.map(|raw| normalize_icon(Some(raw))).transpose()?;
        Ok(self.repo.update_list(list_uuid, &name, icon.as_deref())?)
    }

    pub fn delete_list(&self, list_uuid: ListId) -> ServiceResult<()> {
        Ok(self.repo.delete_list(list_uuid)?)
    }

    pub fn get_list(&self, list_uuid: ListId) -> ServiceResult<Option<ShoppingList>> {
        Ok(self.repo.get_list(list_uuid)?)
    }

    pub fn list_lists(&self) -> ServiceResult<Vec<ListSummary>> {
        Ok(self.repo.list_lists()?)
    }

    pub fn active_list(&self) -> ServiceResult<Option<ShoppingList>> {
        Ok(self.repo.active_list()?)
    }

    pub fn set_active_list(&self, list_uuid: ListId) -> ServiceResult<ShoppingList> {
        Ok(self.repo.set_active_list(list_uuid)?)
    }

    pub fn move_list(
        &self,
        list_uuid: ListId,
        direction: MoveDirection,
    ) -> ServiceResult<MoveOutcome> {
        Ok(self.repo.move_list(list_uuid, direction)?)
    }

    /// Unchecks every item of a list.
    pub fn restart_list(&self, list_uuid: ListId) -> ServiceResult<usize> {
        Ok(self.repo.restart_list(list_uuid)?)
    }

    pub fn list_stats(&self, list_uuid: ListId) -> ServiceResult<CompletionStats> {
        Ok(self.repo.list_stats(list_uuid)?)
    }
}
