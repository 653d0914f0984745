//! Section use-case service.

use super::error::{normalize_name, ServiceResult, SECTION_NAME_MAX_CHARS};
use crate::model::list::ListId;
use crate::model::section::{ListTree, Section, SectionId, SectionWithItems};
use crate::model::CompletionStats;
use crate::ordering::{MoveDirection, MoveOutcome};
use crate::repo::SectionRepository;

/// Section service facade over repository implementations.
pub struct SectionService<R: SectionRepository> {
    repo: R,
}

impl<R: SectionRepository> SectionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_section(&self, list_uuid: ListId, name: &str) -> ServiceResult<Section> {
        let name = normalize_name("section name", name, SECTION_NAME_MAX_CHARS)?;
        Ok(self.repo.create_section(list_uuid, &name)?)
    }

    pub fn rename_section(&self, section_uuid: SectionId, name: &str) -> ServiceResult<Section> {
        let name = normalize_name("section name", name, SECTION_NAME_MAX_CHARS)?;
        Ok(self.repo.rename_section(section_uuid, &name)?)
    }

    pub fn delete_section(&self, section_uuid: SectionId) -> ServiceResult<()> {
        Ok(self.repo.delete_section(section_uuid)?)
    }

    /// Deletes all given sections or none of them.
    pub fn delete_sections(&self, section_uuids: &[SectionId]) -> ServiceResult<usize> {
        Ok(self.repo.delete_sections(section_uuids)?)
    }

    pub fn get_section(&self, section_uuid: SectionId) -> ServiceResult<Option<Section>> {
        Ok(self.repo.get_section(section_uuid)?)
    }

    pub fn list_sections(&self, list_uuid: ListId) -> ServiceResult<Vec<SectionWithItems>> {
        Ok(self.repo.list_sections(list_uuid)?)
    }

    pub fn list_tree(&self, list_uuid: ListId) -> ServiceResult<ListTree> {
        Ok(self.repo.list_tree(list_uuid)?)
    }

    pub fn move_section(
        &self,
        section_uuid: SectionId,
        direction: MoveDirection,
    ) -> ServiceResult<MoveOutcome> {
        Ok(self.repo.move_section(section_uuid, direction)?)
    }

    pub fn section_stats(&self, section_uuid: SectionId) -> ServiceResult<CompletionStats> {
        Ok(self.repo.section_stats(section_uuid)?)
    }
}
