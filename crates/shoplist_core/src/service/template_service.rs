//! Template use-case service.

use super::error::{
    normalize_name, normalize_text, ServiceResult, DESCRIPTION_MAX_CHARS, ITEM_NAME_MAX_CHARS,
    SECTION_NAME_MAX_CHARS, TEMPLATE_NAME_MAX_CHARS,
};
use crate::model::list::ListId;
use crate::model::template::{Template, TemplateId, TemplateItem, TemplateItemId};
use crate::ordering::{MoveDirection, MoveOutcome};
use crate::repo::TemplateRepository;

/// Template service facade over repository implementations.
pub struct TemplateService<R: TemplateRepository> {
    repo: R,
}

impl<R: TemplateRepository> TemplateService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_template(&self, name: &str, description: &str) -> ServiceResult<Template> {
        let name = normalize_name("template name", name, TEMPLATE_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self.repo.create_template(&name, &description)?)
    }

    pub fn update_template(
        &self,
        template_uuid: TemplateId,
        name: &str,
        description: &str,
    ) -> ServiceResult<Template> {
        let name = normalize_name("template name", name, TEMPLATE_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self.repo.update_template(template_uuid, &name, &description)?)
    }

    pub fn delete_template(&self, template_uuid: TemplateId) -> ServiceResult<()> {
        Ok(self.repo.delete_template(template_uuid)?)
    }

    pub fn get_template(&self, template_uuid: TemplateId) -> ServiceResult<Option<Template>> {
        Ok(self.repo.get_template(template_uuid)?)
    }

    pub fn list_templates(&self) -> ServiceResult<Vec<Template>> {
        Ok(self.repo.list_templates()?)
    }

    pub fn move_template(
        &self,
        template_uuid: TemplateId,
        direction: MoveDirection,
    ) -> ServiceResult<MoveOutcome> {
        Ok(self.repo.move_template(template_uuid, direction)?)
    }

    pub fn add_template_item(
        &self,
        template_uuid: TemplateId,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> ServiceResult<TemplateItem> {
        let section_name = normalize_name("section name", section_name, SECTION_NAME_MAX_CHARS)?;
        let name = normalize_name("item name", name, ITEM_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self
            .repo
            .add_template_item(template_uuid, &section_name, &name, &description)?)
    }

    pub fn update_template_item(
        &self,
        item_uuid: TemplateItemId,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> ServiceResult<TemplateItem> {
        let section_name = normalize_name("section name", section_name, SECTION_NAME_MAX_CHARS)?;
        let name = normalize_name("item name", name, ITEM_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self
            .repo
            .update_template_item(item_uuid, &section_name, &name, &description)?)
    }

    pub fn delete_template_item(&self, item_uuid: TemplateItemId) -> ServiceResult<()> {
        Ok(self.repo.delete_template_item(item_uuid)?)
    }

    pub fn move_template_item(
        &self,
        item_uuid: TemplateItemId,
        direction: MoveDirection,
    ) -> ServiceResult<MoveOutcome> {
        Ok(self.repo.move_template_item(item_uuid, direction)?)
    }

    /// Copies the template into a list; returns the number of items created.
    pub fn apply_template(
        &self,
        template_uuid: TemplateId,
        list_uuid: ListId,
    ) -> ServiceResult<usize> {
        Ok(self.repo.apply_template(template_uuid, list_uuid)?)
    }

    /// Captures the incomplete items of a list, section by section.
    pub fn create_template_from_list(
        &self,
        list_uuid: ListId,
        name: &str,
        description: &str,
    ) -> ServiceResult<Template> {
        let name = normalize_name("template name", name, TEMPLATE_NAME_MAX_CHARS)?;
        let description = normalize_text("description", description, DESCRIPTION_MAX_CHARS)?;
        Ok(self
            .repo
            .create_template_from_list(list_uuid, &name, &description)?)
    }
}
