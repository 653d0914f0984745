//! Sibling-group selectors.

use crate::model::EntityKind;
use rusqlite::types::Value;
use uuid::Uuid;

/// Entity kinds that carry a `sort_order` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedKind {
    List,
    Section,
    Item,
    Template,
    TemplateItem,
}

impl OrderedKind {
    pub fn entity_kind(self) -> EntityKind {
        match self {
            Self::List => EntityKind::List,
            Self::Section => EntityKind::Section,
            Self::Item => EntityKind::Item,
            Self::Template => EntityKind::Template,
            Self::TemplateItem => EntityKind::TemplateItem,
        }
    }

    /// Kind of the owning container, `None` for globally ordered kinds.
    pub fn container_kind(self) -> Option<EntityKind> {
        match self {
            Self::List | Self::Template => None,
            Self::Section => Some(EntityKind::List),
            Self::Item => Some(EntityKind::Section),
            Self::TemplateItem => Some(EntityKind::Template),
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::List => "lists",
            Self::Section => "sections",
            Self::Item => "items",
            Self::Template => "templates",
            Self::TemplateItem => "template_items",
        }
    }

    pub(crate) fn container_column(self) -> Option<&'static str> {
        match self {
            Self::List | Self::Template => None,
            Self::Section => Some("list_uuid"),
            Self::Item => Some("section_uuid"),
            Self::TemplateItem => Some("template_uuid"),
        }
    }

    pub(crate) fn container_table(self) -> Option<&'static str> {
        match self {
            Self::List | Self::Template => None,
            Self::Section => Some("lists"),
            Self::Item => Some("sections"),
            Self::TemplateItem => Some("templates"),
        }
    }

    /// SQL predicate selecting rows that take part in positional reorders.
    pub(crate) fn positional_filter(self) -> &'static str {
        match self {
            Self::Item => "completed = 0",
            _ => "1 = 1",
        }
    }

    pub(crate) fn tracks_updates(self) -> bool {
        !matches!(self, Self::TemplateItem)
    }
}

/// One sibling group: a kind plus, for contained kinds, the container id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiblingGroup {
    kind: OrderedKind,
    container: Option<Uuid>,
}

impl SiblingGroup {
    /// All lists.
    pub fn lists() -> Self {
        Self {
            kind: OrderedKind::List,
            container: None,
        }
    }

    /// All templates.
    pub fn templates() -> Self {
        Self {
            kind: OrderedKind::Template,
            container: None,
        }
    }

    /// Sections of one list.
    pub fn sections_of(list_uuid: Uuid) -> Self {
        Self {
            kind: OrderedKind::Section,
            container: Some(list_uuid),
        }
    }

    /// Items of one section.
    pub fn items_of(section_uuid: Uuid) -> Self {
        Self {
            kind: OrderedKind::Item,
            container: Some(section_uuid),
        }
    }

    /// Items of one template.
    pub fn template_items_of(template_uuid: Uuid) -> Self {
        Self {
            kind: OrderedKind::TemplateItem,
            container: Some(template_uuid),
        }
    }

    /// Group of `kind` under `container`; the container is dropped for
    /// globally ordered kinds.
    pub fn of(kind: OrderedKind, container: Option<Uuid>) -> Self {
        Self {
            kind,
            container: kind.container_column().and(container),
        }
    }

    pub fn kind(&self) -> OrderedKind {
        self.kind
    }

    pub fn container(&self) -> Option<Uuid> {
        self.container
    }

    /// `WHERE`-clause fragment and bind values selecting this group.
    pub(crate) fn scope(&self) -> (String, Vec<Value>) {
        match (self.kind.container_column(), self.container) {
            (Some(column), Some(container)) => (
                format!("{column} = ?"),
                vec![Value::Text(container.to_string())],
            ),
            (Some(column), None) => (format!("{column} IS NULL"), Vec::new()),
            (None, _) => ("1 = 1".to_string(), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderedKind, SiblingGroup};
    use uuid::Uuid;

    #[test]
    fn global_groups_ignore_container() {
        let group = SiblingGroup::of(OrderedKind::List, Some(Uuid::new_v4()));
        assert_eq!(group, SiblingGroup::lists());
        let (scope, binds) = group.scope();
        assert_eq!(scope, "1 = 1");
        assert!(binds.is_empty());
    }

    #[test]
    fn contained_groups_bind_container_id() {
        let section = Uuid::new_v4();
        let (scope, binds) = SiblingGroup::items_of(section).scope();
        assert_eq!(scope, "section_uuid = ?");
        assert_eq!(binds.len(), 1);
    }
}
