//! Template repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist templates and their items.
//! - Apply a template to a list and capture a list as a template.
//!
//! # Invariants
//! - Applying a template creates sections, items and history updates in one
//!   transaction.
//! - Sections are matched by name case-insensitively and created in order of
//!   first appearance when missing.

use super::error::{RepoError, RepoResult};
use super::history_repo::upsert_history;
use super::item_repo::insert_item;
use super::list_repo::load_required_list;
use super::rows::parse_uuid;
use super::schema::{
    ensure_connection_ready, ITEMS, ITEM_HISTORY, LISTS, SECTIONS, TEMPLATES, TEMPLATE_ITEMS,
};
use super::section_repo::{insert_section, sections_of_list};
use crate::clock::{system_clock, SharedClock};
use crate::model::list::ListId;
use crate::model::section::SectionId;
use crate::model::template::{Template, TemplateId, TemplateItem, TemplateItemId};
use crate::model::EntityKind;
use crate::ordering::{
    next_sort_order, MoveDirection, MoveOutcome, OrderedKind, OrderingEngine, SiblingGroup,
};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const TEMPLATE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    sort_order,
    created_at,
    updated_at
FROM templates";

const TEMPLATE_ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    template_uuid,
    section_name,
    name,
    description,
    sort_order,
    created_at
FROM template_items";

/// Repository interface for template operations.
pub trait TemplateRepository {
    fn create_template(&self, name: &str, description: &str) -> RepoResult<Template>;
    fn update_template(
        &self,
        template_uuid: TemplateId,
        name: &str,
        description: &str,
    ) -> RepoResult<Template>;
    fn delete_template(&self, template_uuid: TemplateId) -> RepoResult<()>;
    /// Template with its items ordered by `sort_order`.
    fn get_template(&self, template_uuid: TemplateId) -> RepoResult<Option<Template>>;
    fn list_templates(&self) -> RepoResult<Vec<Template>>;
    fn move_template(
        &self,
        template_uuid: TemplateId,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome>;
    fn add_template_item(
        &self,
        template_uuid: TemplateId,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> RepoResult<TemplateItem>;
    fn update_template_item(
        &self,
        item_uuid: TemplateItemId,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> RepoResult<TemplateItem>;
    fn delete_template_item(&self, item_uuid: TemplateItemId) -> RepoResult<()>;
    fn move_template_item(
        &self,
        item_uuid: TemplateItemId,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome>;
    /// Copies every template item into `list_uuid`; returns the created item count.
    fn apply_template(&self, template_uuid: TemplateId, list_uuid: ListId) -> RepoResult<usize>;
    /// Captures the incomplete items of a list as a new template.
    fn create_template_from_list(
        &self,
        list_uuid: ListId,
        name: &str,
        description: &str,
    ) -> RepoResult<Template>;
}

/// SQLite-backed template repository.
pub struct SqliteTemplateRepository<'conn> {
    conn: &'conn Connection,
    clock: SharedClock,
}

impl<'conn> SqliteTemplateRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[&TEMPLATES, &TEMPLATE_ITEMS, &LISTS, &SECTIONS, &ITEMS, &ITEM_HISTORY],
        )?;
        Ok(Self {
            conn,
            clock: system_clock(),
        })
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    fn engine(&self) -> OrderingEngine<'conn> {
        OrderingEngine::new(self.conn, self.clock.clone())
    }
}

impl TemplateRepository for SqliteTemplateRepository<'_> {
    fn create_template(&self, name: &str, description: &str) -> RepoResult<Template> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let template_uuid = insert_template(&tx, name, description, self.clock.now())?;
        let template = load_required_template(&tx, template_uuid)?;
        tx.commit()?;

        info!("event=template_create module=repo status=ok item_count=0");
        Ok(template)
    }

    fn update_template(
        &self,
        template_uuid: TemplateId,
        name: &str,
        description: &str,
    ) -> RepoResult<Template> {
        let changed = self.conn.execute(
            "UPDATE templates SET name = ?2, description = ?3, updated_at = ?4 WHERE uuid = ?1;",
            params![template_uuid.to_string(), name, description, self.clock.now()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Template, template_uuid));
        }
        load_required_template(self.conn, template_uuid)
    }

    fn delete_template(&self, template_uuid: TemplateId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM templates WHERE uuid = ?1;", [template_uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Template, template_uuid));
        }
        Ok(())
    }

    fn get_template(&self, template_uuid: TemplateId) -> RepoResult<Option<Template>> {
        load_template(self.conn, template_uuid)
    }

    fn list_templates(&self) -> RepoResult<Vec<Template>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEMPLATE_SELECT_SQL} ORDER BY sort_order ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }
        for template in &mut templates {
            template.items = template_items(self.conn, template.uuid)?;
        }
        Ok(templates)
    }

    fn move_template(
        &self,
        template_uuid: TemplateId,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome> {
        self.engine()
            .move_adjacent(OrderedKind::Template, template_uuid, direction)
    }

    fn add_template_item(
        &self,
        template_uuid: TemplateId,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> RepoResult<TemplateItem> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        load_required_template(&tx, template_uuid)?;
        let item_uuid = insert_template_item(
            &tx,
            template_uuid,
            section_name,
            name,
            description,
            self.clock.now(),
        )?;
        let item = load_required_template_item(&tx, item_uuid)?;
        tx.commit()?;
        Ok(item)
    }

    fn update_template_item(
        &self,
        item_uuid: TemplateItemId,
        section_name: &str,
        name: &str,
        description: &str,
    ) -> RepoResult<TemplateItem> {
        let changed = self.conn.execute(
            "UPDATE template_items
             SET section_name = ?2, name = ?3, description = ?4
             WHERE uuid = ?1;",
            params![item_uuid.to_string(), section_name, name, description],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::TemplateItem, item_uuid));
        }
        load_required_template_item(self.conn, item_uuid)
    }

    fn delete_template_item(&self, item_uuid: TemplateItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM template_items WHERE uuid = ?1;", [item_uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::TemplateItem, item_uuid));
        }
        Ok(())
    }

    fn move_template_item(
        &self,
        item_uuid: TemplateItemId,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome> {
        self.engine()
            .move_adjacent(OrderedKind::TemplateItem, item_uuid, direction)
    }

    fn apply_template(&self, template_uuid: TemplateId, list_uuid: ListId) -> RepoResult<usize> {
        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let template = load_required_template(&tx, template_uuid)?;
        load_required_list(&tx, list_uuid)?;

        let mut sections_created = 0;
        for item in &template.items {
            let section_uuid = match find_section_by_name(&tx, list_uuid, &item.section_name)? {
                Some(existing) => existing,
                None => {
                    sections_created += 1;
                    insert_section(&tx, list_uuid, &item.section_name, now)?
                }
            };
            insert_item(&tx, section_uuid, &item.name, &item.description, now)?;
            upsert_history(&tx, &item.name, Some(section_uuid), now)?;
        }
        tx.execute(
            "UPDATE lists SET updated_at = ?2 WHERE uuid = ?1;",
            params![list_uuid.to_string(), now],
        )?;
        tx.commit()?;

        info!(
            "event=template_apply module=repo status=ok item_count={} sections_created={sections_created}",
            template.items.len()
        );
        Ok(template.items.len())
    }

    fn create_template_from_list(
        &self,
        list_uuid: ListId,
        name: &str,
        description: &str,
    ) -> RepoResult<Template> {
        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        load_required_list(&tx, list_uuid)?;
        let template_uuid = insert_template(&tx, name, description, now)?;

        let mut item_stmt = tx.prepare(
            "SELECT name, description
             FROM items
             WHERE section_uuid = ?1 AND completed = 0
             ORDER BY sort_order ASC, rowid ASC;",
        )?;
        let mut sort_order = 0_i64;
        for section in sections_of_list(&tx, list_uuid)? {
            let mut rows = item_stmt.query([section.uuid.to_string()])?;
            while let Some(row) = rows.next()? {
                let item_name: String = row.get(0)?;
                let item_description: String = row.get(1)?;
                tx.execute(
                    "INSERT INTO template_items (
                        uuid, template_uuid, section_name, name, description, sort_order, created_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                    params![
                        Uuid::new_v4().to_string(),
                        template_uuid.to_string(),
                        section.name,
                        item_name,
                        item_description,
                        sort_order,
                        now,
                    ],
                )?;
                sort_order += 1;
            }
        }
        drop(item_stmt);

        let template = load_required_template(&tx, template_uuid)?;
        tx.commit()?;

        info!(
            "event=template_create module=repo status=ok item_count={}",
            template.items.len()
        );
        Ok(template)
    }
}

fn insert_template(
    conn: &Connection,
    name: &str,
    description: &str,
    now: i64,
) -> RepoResult<TemplateId> {
    let template_uuid = Uuid::new_v4();
    let sort_order = next_sort_order(conn, SiblingGroup::templates())?;
    conn.execute(
        "INSERT INTO templates (uuid, name, description, sort_order, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
        params![template_uuid.to_string(), name, description, sort_order, now],
    )?;
    Ok(template_uuid)
}

fn insert_template_item(
    conn: &Connection,
    template_uuid: TemplateId,
    section_name: &str,
    name: &str,
    description: &str,
    now: i64,
) -> RepoResult<TemplateItemId> {
    let item_uuid = Uuid::new_v4();
    let sort_order = next_sort_order(conn, SiblingGroup::template_items_of(template_uuid))?;
    conn.execute(
        "INSERT INTO template_items (
            uuid, template_uuid, section_name, name, description, sort_order, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            item_uuid.to_string(),
            template_uuid.to_string(),
            section_name,
            name,
            description,
            sort_order,
            now,
        ],
    )?;
    Ok(item_uuid)
}

fn find_section_by_name(
    conn: &Connection,
    list_uuid: ListId,
    section_name: &str,
) -> RepoResult<Option<SectionId>> {
    let found: Option<String> = conn
        .query_row(
            "SELECT uuid
             FROM sections
             WHERE list_uuid = ?1 AND name = ?2 COLLATE NOCASE
             ORDER BY sort_order ASC, rowid ASC
             LIMIT 1;",
            params![list_uuid.to_string(), section_name],
            |row| row.get(0),
        )
        .optional()?;
    found
        .map(|text| parse_uuid(&text, "sections.uuid"))
        .transpose()
}

fn load_template(conn: &Connection, template_uuid: TemplateId) -> RepoResult<Option<Template>> {
    let mut stmt = conn.prepare(&format!("{TEMPLATE_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([template_uuid.to_string()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let mut template = parse_template_row(row)?;
    template.items = template_items(conn, template_uuid)?;
    Ok(Some(template))
}

fn load_required_template(conn: &Connection, template_uuid: TemplateId) -> RepoResult<Template> {
    load_template(conn, template_uuid)?
        .ok_or_else(|| RepoError::not_found(EntityKind::Template, template_uuid))
}

fn template_items(conn: &Connection, template_uuid: TemplateId) -> RepoResult<Vec<TemplateItem>> {
    let mut stmt = conn.prepare(&format!(
        "{TEMPLATE_ITEM_SELECT_SQL} WHERE template_uuid = ?1 ORDER BY sort_order ASC, rowid ASC;"
    ))?;
    let mut rows = stmt.query([template_uuid.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_template_item_row(row)?);
    }
    Ok(items)
}

fn load_required_template_item(
    conn: &Connection,
    item_uuid: TemplateItemId,
) -> RepoResult<TemplateItem> {
    let mut stmt = conn.prepare(&format!("{TEMPLATE_ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([item_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_template_item_row(row);
    }
    Err(RepoError::not_found(EntityKind::TemplateItem, item_uuid))
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<Template> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Template {
        uuid: parse_uuid(&uuid_text, "templates.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        items: Vec::new(),
    })
}

fn parse_template_item_row(row: &Row<'_>) -> RepoResult<TemplateItem> {
    let uuid_text: String = row.get("uuid")?;
    let template_text: String = row.get("template_uuid")?;
    Ok(TemplateItem {
        uuid: parse_uuid(&uuid_text, "template_items.uuid")?,
        template_uuid: parse_uuid(&template_text, "template_items.template_uuid")?,
        section_name: row.get("section_name")?,
        name: row.get("name")?,
        description: row.get("description")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    })
}
