//! Reusable list templates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TemplateId = Uuid;
pub type TemplateItemId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub uuid: TemplateId,
    pub name: String,
    pub description: String,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
    /// Ordered by `sort_order`.
    pub items: Vec<TemplateItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub uuid: TemplateItemId,
    pub template_uuid: TemplateId,
    /// Section the item lands in when the template is applied, matched
    /// case-insensitively against existing section names.
    pub section_name: String,
    pub name: String,
    pub description: String,
    pub sort_order: i64,
    pub created_at: i64,
}
