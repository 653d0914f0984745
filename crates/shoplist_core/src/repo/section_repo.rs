//! Section repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist sections inside lists and assemble list trees.
//!
//! # Invariants
//! - New sections append to the end of their list.
//! - Batch delete is all-or-nothing: one missing id rolls back every delete.
//! - Deleting a section cascades to its items and clears history links.

use super::error::{RepoError, RepoResult};
use super::item_repo::items_in_section;
use super::list_repo::load_required_list;
use super::rows::parse_uuid;
use super::schema::{ensure_connection_ready, ITEMS, LISTS, SECTIONS};
use crate::clock::{system_clock, SharedClock};
use crate::model::list::ListId;
use crate::model::section::{ListTree, Section, SectionId, SectionWithItems};
use crate::model::{CompletionStats, EntityKind};
use crate::ordering::{
    next_sort_order, MoveDirection, MoveOutcome, OrderedKind, OrderingEngine, SiblingGroup,
};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const SECTION_SELECT_SQL: &str = "SELECT
    uuid,
    list_uuid,
    name,
    sort_order,
    created_at,
    updated_at
FROM sections";

/// Repository interface for section operations.
pub trait SectionRepository {
    /// Appends a section to a list.
    fn create_section(&self, list_uuid: ListId, name: &str) -> RepoResult<Section>;
    fn rename_section(&self, section_uuid: SectionId, name: &str) -> RepoResult<Section>;
    fn delete_section(&self, section_uuid: SectionId) -> RepoResult<()>;
    /// Deletes several sections in one transaction.
    fn delete_sections(&self, section_uuids: &[SectionId]) -> RepoResult<usize>;
    fn get_section(&self, section_uuid: SectionId) -> RepoResult<Option<Section>>;
    /// Sections of a list in order, each with items in display order.
    fn list_sections(&self, list_uuid: ListId) -> RepoResult<Vec<SectionWithItems>>;
    /// The list record together with [`SectionRepository::list_sections`].
    fn list_tree(&self, list_uuid: ListId) -> RepoResult<ListTree>;
    fn move_section(
        &self,
        section_uuid: SectionId,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome>;
    fn section_stats(&self, section_uuid: SectionId) -> RepoResult<CompletionStats>;
}

/// SQLite-backed section repository.
pub struct SqliteSectionRepository<'conn> {
    conn: &'conn Connection,
    clock: SharedClock,
}

impl<'conn> SqliteSectionRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&LISTS, &SECTIONS, &ITEMS])?;
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
}

impl SectionRepository for SqliteSectionRepository<'_> {
    fn create_section(&self, list_uuid: ListId, name: &str) -> RepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let section_uuid = insert_section(&tx, list_uuid, name, self.clock.now())?;
        let section = load_required_section(&tx, section_uuid)?;
        tx.commit()?;

        info!(
            "event=section_create module=repo status=ok sort_order={}",
            section.sort_order
        );
        Ok(section)
    }

    fn rename_section(&self, section_uuid: SectionId, name: &str) -> RepoResult<Section> {
        let changed = self.conn.execute(
            "UPDATE sections SET name = ?2, updated_at = ?3 WHERE uuid = ?1;",
            params![section_uuid.to_string(), name, self.clock.now()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Section, section_uuid));
        }
        load_required_section(self.conn, section_uuid)
    }

    fn delete_section(&self, section_uuid: SectionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sections WHERE uuid = ?1;", [section_uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Section, section_uuid));
        }
        Ok(())
    }

    fn delete_sections(&self, section_uuids: &[SectionId]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut deleted = 0;
        for section_uuid in section_uuids {
            let changed =
                tx.execute("DELETE FROM sections WHERE uuid = ?1;", [section_uuid.to_string()])?;
            if changed == 0 {
                return Err(RepoError::not_found(EntityKind::Section, *section_uuid));
            }
            deleted += changed;
        }
        tx.commit()?;

        info!("event=section_delete module=repo status=ok count={deleted}");
        Ok(deleted)
    }

    fn get_section(&self, section_uuid: SectionId) -> RepoResult<Option<Section>> {
        load_section(self.conn, section_uuid)
    }

    fn list_sections(&self, list_uuid: ListId) -> RepoResult<Vec<SectionWithItems>> {
        load_required_list(self.conn, list_uuid)?;
        sections_with_items(self.conn, list_uuid)
    }

    fn list_tree(&self, list_uuid: ListId) -> RepoResult<ListTree> {
        let list = load_required_list(self.conn, list_uuid)?;
        let sections = sections_with_items(self.conn, list_uuid)?;
        Ok(ListTree { list, sections })
    }

    fn move_section(
        &self,
        section_uuid: SectionId,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome> {
        OrderingEngine::new(self.conn, self.clock.clone()).move_adjacent(
            OrderedKind::Section,
            section_uuid,
            direction,
        )
    }

    fn section_stats(&self, section_uuid: SectionId) -> RepoResult<CompletionStats> {
        load_required_section(self.conn, section_uuid)?;
        let (total, completed) = self.conn.query_row(
            "SELECT COUNT(uuid), COALESCE(SUM(completed), 0) FROM items WHERE section_uuid = ?1;",
            [section_uuid.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(CompletionStats::from_counts(total, completed))
    }
}

/// Appends a section to a list. Caller owns the transaction.
pub(crate) fn insert_section(
    conn: &Connection,
    list_uuid: ListId,
    name: &str,
    now: i64,
) -> RepoResult<SectionId> {
    load_required_list(conn, list_uuid)?;

    let section_uuid = Uuid::new_v4();
    let sort_order = next_sort_order(conn, SiblingGroup::sections_of(list_uuid))?;
    conn.execute(
        "INSERT INTO sections (uuid, list_uuid, name, sort_order, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
        params![
            section_uuid.to_string(),
            list_uuid.to_string(),
            name,
            sort_order,
            now,
        ],
    )?;
    Ok(section_uuid)
}

/// Sections of a list in `sort_order`, insertion order on ties.
pub(crate) fn sections_of_list(conn: &Connection, list_uuid: ListId) -> RepoResult<Vec<Section>> {
    let mut stmt = conn.prepare(&format!(
        "{SECTION_SELECT_SQL} WHERE list_uuid = ?1 ORDER BY sort_order ASC, rowid ASC;"
    ))?;
    let mut rows = stmt.query([list_uuid.to_string()])?;
    let mut sections = Vec::new();
    while let Some(row) = rows.next()? {
        sections.push(parse_section_row(row)?);
    }
    Ok(sections)
}

fn sections_with_items(conn: &Connection, list_uuid: ListId) -> RepoResult<Vec<SectionWithItems>> {
    sections_of_list(conn, list_uuid)?
        .into_iter()
        .map(|section| {
            let items = items_in_section(conn, section.uuid)?;
            Ok(SectionWithItems { section, items })
        })
        .collect()
}

fn load_section(conn: &Connection, section_uuid: SectionId) -> RepoResult<Option<Section>> {
    let mut stmt = conn.prepare(&format!("{SECTION_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([section_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_section_row(row)?));
    }
    Ok(None)
}

fn load_required_section(conn: &Connection, section_uuid: SectionId) -> RepoResult<Section> {
    load_section(conn, section_uuid)?
        .ok_or_else(|| RepoError::not_found(EntityKind::Section, section_uuid))
}

fn parse_section_row(row: &Row<'_>) -> RepoResult<Section> {
    let uuid_text: String = row.get("uuid")?;
    let list_text: String = row.get("list_uuid")?;
    Ok(Section {
        uuid: parse_uuid(&uuid_text, "sections.uuid")?,
        list_uuid: parse_uuid(&list_text, "sections.list_uuid")?,
        name: row.get("name")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
