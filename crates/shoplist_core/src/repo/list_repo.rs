//! List repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist lists, their ordering and the active-list flag.
//! - Report per-list completion counters.
//!
//! # Invariants
//! - Once any list exists exactly one has `is_active = 1`: the first list
//!   created is activated, and deleting the active list promotes the first
//!   remaining list by order.
//! - Activation clears the old flag before setting the new one inside one
//!   transaction; the partial unique index rejects two active rows.
//! - Listing is deterministic: `sort_order ASC`, then insertion order.

use super::error::{RepoError, RepoResult};
use super::rows::{bool_to_int, parse_flag, parse_uuid};
use super::schema::{ensure_connection_ready, ITEMS, LISTS, SECTIONS};
use crate::clock::{system_clock, SharedClock};
use crate::model::list::{ListId, ListSummary, ShoppingList};
use crate::model::{CompletionStats, EntityKind};
use crate::ordering::{
    next_sort_order, MoveDirection, MoveOutcome, OrderedKind, OrderingEngine, SiblingGroup,
};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const LIST_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    icon,
    sort_order,
    is_active,
    created_at,
    updated_at
FROM lists";

/// Repository interface for list operations.
pub trait ListRepository {
    /// Appends a new list; the first list ever stored becomes active.
    fn create_list(&self, name: &str, icon: &str) -> RepoResult<ShoppingList>;
    /// Renames a list and replaces the icon when one is given.
    fn update_list(
        &self,
        list_uuid: ListId,
        name: &str,
        icon: Option<&str>,
    ) -> RepoResult<ShoppingList>;
    /// Deletes a list with its sections and items.
    fn delete_list(&self, list_uuid: ListId) -> RepoResult<()>;
    fn get_list(&self, list_uuid: ListId) -> RepoResult<Option<ShoppingList>>;
    /// All lists in order, with completion counters.
    fn list_lists(&self) -> RepoResult<Vec<ListSummary>>;
    fn active_list(&self) -> RepoResult<Option<ShoppingList>>;
    /// Makes `list_uuid` the only active list.
    fn set_active_list(&self, list_uuid: ListId) -> RepoResult<ShoppingList>;
    fn move_list(&self, list_uuid: ListId, direction: MoveDirection) -> RepoResult<MoveOutcome>;
    /// Unchecks every completed item of a list; returns how many changed.
    fn restart_list(&self, list_uuid: ListId) -> RepoResult<usize>;
    fn list_stats(&self, list_uuid: ListId) -> RepoResult<CompletionStats>;
}

/// SQLite-backed list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
    clock: SharedClock,
}

impl<'conn> SqliteListRepository<'conn> {
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

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, name: &str, icon: &str) -> RepoResult<ShoppingList> {
        let list_uuid = Uuid::new_v4();
        let now = self.clock.now();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let sort_order = next_sort_order(&tx, SiblingGroup::lists())?;
        let has_active: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM lists WHERE is_active = 1);",
            [],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO lists (uuid, name, icon, sort_order, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                list_uuid.to_string(),
                name,
                icon,
                sort_order,
                bool_to_int(has_active == 0),
                now,
            ],
        )?;
        let list = load_required_list(&tx, list_uuid)?;
        tx.commit()?;

        info!(
            "event=list_create module=repo status=ok sort_order={} is_active={}",
            list.sort_order, list.is_active
        );
        Ok(list)
    }

    fn update_list(
        &self,
        list_uuid: ListId,
        name: &str,
        icon: Option<&str>,
    ) -> RepoResult<ShoppingList> {
        let now = self.clock.now();
        let changed = match icon {
            Some(icon) => self.conn.execute(
                "UPDATE lists SET name = ?2, icon = ?3, updated_at = ?4 WHERE uuid = ?1;",
                params![list_uuid.to_string(), name, icon, now],
            )?,
            None => self.conn.execute(
                "UPDATE lists SET name = ?2, updated_at = ?3 WHERE uuid = ?1;",
                params![list_uuid.to_string(), name, now],
            )?,
        };
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::List, list_uuid));
        }
        load_required_list(self.conn, list_uuid)
    }

    fn delete_list(&self, list_uuid: ListId) -> RepoResult<()> {
        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let was_active = load_required_list(&tx, list_uuid)?.is_active;

        tx.execute("DELETE FROM lists WHERE uuid = ?1;", [list_uuid.to_string()])?;

        if was_active {
            tx.execute(
                "UPDATE lists
                 SET is_active = 1, updated_at = ?1
                 WHERE uuid = (
                     SELECT uuid FROM lists ORDER BY sort_order ASC, rowid ASC LIMIT 1
                 );",
                [now],
            )?;
        }
        tx.commit()?;

        info!("event=list_delete module=repo status=ok was_active={was_active}");
        Ok(())
    }

    fn get_list(&self, list_uuid: ListId) -> RepoResult<Option<ShoppingList>> {
        load_list(self.conn, list_uuid)
    }

    fn list_lists(&self) -> RepoResult<Vec<ListSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                l.uuid AS uuid,
                l.name AS name,
                l.icon AS icon,
                l.sort_order AS sort_order,
                l.is_active AS is_active,
                l.created_at AS created_at,
                l.updated_at AS updated_at,
                COUNT(i.uuid) AS total_items,
                COALESCE(SUM(i.completed), 0) AS completed_items
             FROM lists l
             LEFT JOIN sections s ON s.list_uuid = l.uuid
             LEFT JOIN items i ON i.section_uuid = s.uuid
             GROUP BY l.uuid
             ORDER BY l.sort_order ASC, l.rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(ListSummary {
                list: parse_list_row(row)?,
                stats: CompletionStats::from_counts(
                    row.get("total_items")?,
                    row.get("completed_items")?,
                ),
            });
        }
        Ok(lists)
    }

    fn active_list(&self) -> RepoResult<Option<ShoppingList>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LIST_SELECT_SQL} WHERE is_active = 1 LIMIT 1;"))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_list_row(row)?));
        }
        Ok(None)
    }

    fn set_active_list(&self, list_uuid: ListId) -> RepoResult<ShoppingList> {
        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        load_required_list(&tx, list_uuid)?;

        tx.execute(
            "UPDATE lists SET is_active = 0 WHERE is_active = 1 AND uuid <> ?1;",
            [list_uuid.to_string()],
        )?;
        tx.execute(
            "UPDATE lists SET is_active = 1, updated_at = ?2 WHERE uuid = ?1;",
            params![list_uuid.to_string(), now],
        )?;
        let list = load_required_list(&tx, list_uuid)?;
        tx.commit()?;

        info!("event=list_activate module=repo status=ok");
        Ok(list)
    }

    fn move_list(&self, list_uuid: ListId, direction: MoveDirection) -> RepoResult<MoveOutcome> {
        OrderingEngine::new(self.conn, self.clock.clone()).move_adjacent(
            OrderedKind::List,
            list_uuid,
            direction,
        )
    }

    fn restart_list(&self, list_uuid: ListId) -> RepoResult<usize> {
        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        load_required_list(&tx, list_uuid)?;

        let changed = tx.execute(
            "UPDATE items
             SET completed = 0, updated_at = ?2
             WHERE completed = 1
               AND section_uuid IN (SELECT uuid FROM sections WHERE list_uuid = ?1);",
            params![list_uuid.to_string(), now],
        )?;
        tx.execute(
            "UPDATE lists SET updated_at = ?2 WHERE uuid = ?1;",
            params![list_uuid.to_string(), now],
        )?;
        tx.commit()?;

        info!("event=list_restart module=repo status=ok items_reset={changed}");
        Ok(changed)
    }

    fn list_stats(&self, list_uuid: ListId) -> RepoResult<CompletionStats> {
        load_required_list(self.conn, list_uuid)?;
        let (total, completed) = self.conn.query_row(
            "SELECT COUNT(i.uuid), COALESCE(SUM(i.completed), 0)
             FROM items i
             INNER JOIN sections s ON s.uuid = i.section_uuid
             WHERE s.list_uuid = ?1;",
            [list_uuid.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(CompletionStats::from_counts(total, completed))
    }
}

pub(crate) fn load_list(conn: &Connection, list_uuid: ListId) -> RepoResult<Option<ShoppingList>> {
    let mut stmt = conn.prepare(&format!("{LIST_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([list_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_list_row(row)?));
    }
    Ok(None)
}

pub(crate) fn load_required_list(conn: &Connection, list_uuid: ListId) -> RepoResult<ShoppingList> {
    load_list(conn, list_uuid)?.ok_or_else(|| RepoError::not_found(EntityKind::List, list_uuid))
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<ShoppingList> {
    let uuid_text: String = row.get("uuid")?;
    Ok(ShoppingList {
        uuid: parse_uuid(&uuid_text, "lists.uuid")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        sort_order: row.get("sort_order")?,
        is_active: parse_flag(row.get("is_active")?, "lists.is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
