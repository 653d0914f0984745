//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist items and their flags inside sections.
//! - Route every positional change through the ordering engine.
//! - Record item names in history as part of item creation.
//!
//! # Invariants
//! - Item insert, append order and history upsert commit together.
//! - Reads return display order: incomplete first, then by `sort_order`,
//!   then insertion order.

use super::error::{RepoError, RepoResult};
use super::history_repo::upsert_history;
use super::rows::{bool_to_int, parse_flag, parse_uuid};
use super::schema::{ensure_connection_ready, ITEMS, ITEM_HISTORY, SECTIONS};
use crate::clock::{system_clock, SharedClock};
use crate::model::item::{Item, ItemId};
use crate::model::list::ListId;
use crate::model::section::SectionId;
use crate::model::EntityKind;
use crate::ordering::{
    next_sort_order, MoveDirection, MoveOutcome, OrderedKind, OrderingEngine, SiblingGroup,
};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    section_uuid,
    name,
    description,
    completed,
    uncertain,
    sort_order,
    created_at,
    updated_at
FROM items";

/// Repository interface for item operations.
pub trait ItemRepository {
    /// Appends an item to a section and records its name in history.
    fn create_item(
        &self,
        section_uuid: SectionId,
        name: &str,
        description: &str,
    ) -> RepoResult<Item>;
    fn update_item(&self, item_uuid: ItemId, name: &str, description: &str) -> RepoResult<Item>;
    fn delete_item(&self, item_uuid: ItemId) -> RepoResult<()>;
    /// Removes every completed item of a list; returns how many were removed.
    fn delete_completed_items(&self, list_uuid: ListId) -> RepoResult<usize>;
    fn get_item(&self, item_uuid: ItemId) -> RepoResult<Option<Item>>;
    /// Items of a section in display order.
    fn list_items(&self, section_uuid: SectionId) -> RepoResult<Vec<Item>>;
    fn toggle_completed(&self, item_uuid: ItemId) -> RepoResult<Item>;
    fn toggle_uncertain(&self, item_uuid: ItemId) -> RepoResult<Item>;
    fn move_item(&self, item_uuid: ItemId, direction: MoveDirection) -> RepoResult<MoveOutcome>;
    /// Moves an item to the end of another section.
    fn move_item_to_section(&self, item_uuid: ItemId, section_uuid: SectionId) -> RepoResult<Item>;
    /// Moves an item into a section at a position among its incomplete items.
    fn move_item_to_section_at(
        &self,
        item_uuid: ItemId,
        section_uuid: SectionId,
        position: i64,
    ) -> RepoResult<Item>;
    /// Repositions an item among the incomplete items of its own section.
    fn reorder_item(&self, item_uuid: ItemId, position: i64) -> RepoResult<Item>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    clock: SharedClock,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&SECTIONS, &ITEMS, &ITEM_HISTORY])?;
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

    fn toggle_flag(&self, item_uuid: ItemId, column: &str) -> RepoResult<Item> {
        let changed = self.conn.execute(
            &format!("UPDATE items SET {column} = 1 - {column}, updated_at = ?2 WHERE uuid = ?1;"),
            params![item_uuid.to_string(), self.clock.now()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Item, item_uuid));
        }
        load_required_item(self.conn, item_uuid)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(
        &self,
        section_uuid: SectionId,
        name: &str,
        description: &str,
    ) -> RepoResult<Item> {
        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let item_uuid = insert_item(&tx, section_uuid, name, description, now)?;
        upsert_history(&tx, name, Some(section_uuid), now)?;
        let item = load_required_item(&tx, item_uuid)?;
        tx.commit()?;

        info!(
            "event=item_create module=repo status=ok sort_order={}",
            item.sort_order
        );
        Ok(item)
    }

    fn update_item(&self, item_uuid: ItemId, name: &str, description: &str) -> RepoResult<Item> {
        let changed = self.conn.execute(
            "UPDATE items SET name = ?2, description = ?3, updated_at = ?4 WHERE uuid = ?1;",
            params![item_uuid.to_string(), name, description, self.clock.now()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Item, item_uuid));
        }
        load_required_item(self.conn, item_uuid)
    }

    fn delete_item(&self, item_uuid: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [item_uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Item, item_uuid));
        }
        Ok(())
    }

    fn delete_completed_items(&self, list_uuid: ListId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let list_found: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM lists WHERE uuid = ?1);",
            [list_uuid.to_string()],
            |row| row.get(0),
        )?;
        if list_found == 0 {
            return Err(RepoError::not_found(EntityKind::List, list_uuid));
        }
        let deleted = tx.execute(
            "DELETE FROM items
             WHERE completed = 1
               AND section_uuid IN (SELECT uuid FROM sections WHERE list_uuid = ?1);",
            [list_uuid.to_string()],
        )?;
        tx.commit()?;

        info!("event=item_delete_completed module=repo status=ok count={deleted}");
        Ok(deleted)
    }

    fn get_item(&self, item_uuid: ItemId) -> RepoResult<Option<Item>> {
        load_item(self.conn, item_uuid)
    }

    fn list_items(&self, section_uuid: SectionId) -> RepoResult<Vec<Item>> {
        let found: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sections WHERE uuid = ?1);",
            [section_uuid.to_string()],
            |row| row.get(0),
        )?;
        if found == 0 {
            return Err(RepoError::not_found(EntityKind::Section, section_uuid));
        }
        items_in_section(self.conn, section_uuid)
    }

    fn toggle_completed(&self, item_uuid: ItemId) -> RepoResult<Item> {
        self.toggle_flag(item_uuid, "completed")
    }

    fn toggle_uncertain(&self, item_uuid: ItemId) -> RepoResult<Item> {
        self.toggle_flag(item_uuid, "uncertain")
    }

    fn move_item(&self, item_uuid: ItemId, direction: MoveDirection) -> RepoResult<MoveOutcome> {
        self.engine()
            .move_adjacent(OrderedKind::Item, item_uuid, direction)
    }

    fn move_item_to_section(&self, item_uuid: ItemId, section_uuid: SectionId) -> RepoResult<Item> {
        self.engine()
            .append_to(OrderedKind::Item, item_uuid, section_uuid)?;
        load_required_item(self.conn, item_uuid)
    }

    fn move_item_to_section_at(
        &self,
        item_uuid: ItemId,
        section_uuid: SectionId,
        position: i64,
    ) -> RepoResult<Item> {
        self.engine()
            .relocate_to(OrderedKind::Item, item_uuid, section_uuid, position)?;
        load_required_item(self.conn, item_uuid)
    }

    fn reorder_item(&self, item_uuid: ItemId, position: i64) -> RepoResult<Item> {
        self.engine()
            .relocate_within(OrderedKind::Item, item_uuid, position)?;
        load_required_item(self.conn, item_uuid)
    }
}

/// Inserts an item at the end of its section. Caller owns the transaction.
pub(crate) fn insert_item(
    conn: &Connection,
    section_uuid: SectionId,
    name: &str,
    description: &str,
    now: i64,
) -> RepoResult<ItemId> {
    let found: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sections WHERE uuid = ?1);",
        [section_uuid.to_string()],
        |row| row.get(0),
    )?;
    if found == 0 {
        return Err(RepoError::not_found(EntityKind::Section, section_uuid));
    }

    let item_uuid = Uuid::new_v4();
    let sort_order = next_sort_order(conn, SiblingGroup::items_of(section_uuid))?;
    conn.execute(
        "INSERT INTO items (
            uuid, section_uuid, name, description, completed, uncertain,
            sort_order, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7, ?7);",
        params![
            item_uuid.to_string(),
            section_uuid.to_string(),
            name,
            description,
            bool_to_int(false),
            sort_order,
            now,
        ],
    )?;
    Ok(item_uuid)
}

/// Items of one section in display order.
pub(crate) fn items_in_section(
    conn: &Connection,
    section_uuid: SectionId,
) -> RepoResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!(
        "{ITEM_SELECT_SQL}
         WHERE section_uuid = ?1
         ORDER BY completed ASC, sort_order ASC, rowid ASC;"
    ))?;
    let mut rows = stmt.query([section_uuid.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }
    Ok(items)
}

fn load_item(conn: &Connection, item_uuid: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([item_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_item_row(row)?));
    }
    Ok(None)
}

fn load_required_item(conn: &Connection, item_uuid: ItemId) -> RepoResult<Item> {
    load_item(conn, item_uuid)?.ok_or_else(|| RepoError::not_found(EntityKind::Item, item_uuid))
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let section_text: String = row.get("section_uuid")?;
    Ok(Item {
        uuid: parse_uuid(&uuid_text, "items.uuid")?,
        section_uuid: parse_uuid(&section_text, "items.section_uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        completed: parse_flag(row.get("completed")?, "items.completed")?,
        uncertain: parse_flag(row.get("uncertain")?, "items.uncertain")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
