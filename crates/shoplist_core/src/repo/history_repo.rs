//! Item history persistence backing the suggestion engine.
//!
//! # Responsibility
//! - Record one use of an item name per item creation.
//! - Serve ranked candidate pools and history management reads.
//!
//! # Invariants
//! - At most one entry per case-insensitive name; the upsert is a single
//!   statement so concurrent writers can never produce duplicates.
//! - Deleting a section nulls `last_section_uuid` but keeps the entry.
//! - Reads order by `usage_count DESC, last_used_at DESC`, then insertion.

use super::error::{RepoError, RepoResult};
use super::rows::{parse_optional_uuid, parse_uuid};
use super::schema::{ensure_connection_ready, ITEM_HISTORY, SECTIONS};
use crate::clock::{system_clock, SharedClock};
use crate::model::history::{HistoryEntry, HistoryId};
use crate::model::section::SectionId;
use crate::model::EntityKind;
use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const HISTORY_SELECT_SQL: &str = "SELECT
    h.uuid AS uuid,
    h.name AS name,
    h.last_section_uuid AS last_section_uuid,
    s.name AS last_section_name,
    h.usage_count AS usage_count,
    h.last_used_at AS last_used_at
FROM item_history h
LEFT JOIN sections s ON s.uuid = h.last_section_uuid";

/// Repository interface for item history.
pub trait HistoryRepository {
    /// Records one use of `name`, creating the entry on first use.
    fn record_use(&self, name: &str, section_uuid: Option<SectionId>) -> RepoResult<HistoryEntry>;
    /// Case-insensitive lookup.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<HistoryEntry>>;
    /// Top entries by usage then recency.
    fn top_entries(&self, limit: usize) -> RepoResult<Vec<HistoryEntry>>;
    fn delete_entry(&self, id: HistoryId) -> RepoResult<()>;
    /// Deletes every listed entry that exists; returns the affected count.
    fn delete_entries(&self, ids: &[HistoryId]) -> RepoResult<usize>;
}

/// SQLite-backed history repository.
pub struct SqliteHistoryRepository<'conn> {
    conn: &'conn Connection,
    clock: SharedClock,
}

impl<'conn> SqliteHistoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&ITEM_HISTORY, &SECTIONS])?;
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

impl HistoryRepository for SqliteHistoryRepository<'_> {
    fn record_use(&self, name: &str, section_uuid: Option<SectionId>) -> RepoResult<HistoryEntry> {
        upsert_history(self.conn, name, section_uuid, self.clock.now())?;
        self.find_by_name(name)?.ok_or_else(|| {
            RepoError::InvalidData("history entry missing after upsert".to_string())
        })
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<HistoryEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HISTORY_SELECT_SQL} WHERE h.name = ?1 LIMIT 1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_history_row(row)?));
        }
        Ok(None)
    }

    fn top_entries(&self, limit: usize) -> RepoResult<Vec<HistoryEntry>> {
        top_history_entries(self.conn, limit)
    }

    fn delete_entry(&self, id: HistoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM item_history WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::HistoryEntry, id));
        }
        info!("event=history_delete module=repo status=ok count=1");
        Ok(())
    }

    fn delete_entries(&self, ids: &[HistoryId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            deleted += tx.execute(
                &format!("DELETE FROM item_history WHERE uuid IN ({placeholders});"),
                params_from_iter(chunk.iter().map(Uuid::to_string)),
            )?;
        }
        tx.commit()?;

        info!(
            "event=history_delete module=repo status=ok requested={} count={deleted}",
            ids.len()
        );
        Ok(deleted)
    }
}

const DELETE_CHUNK_SIZE: usize = 500;

/// Single-statement upsert keyed by the case-insensitive name.
///
/// Name identity uses SQLite `NOCASE`, which folds ASCII letters only:
/// `Milk`/`MILK` share one entry while `Äpfel`/`äpfel` stay separate.
/// Suggestion scoring lowercases full Unicode, so both still match a query.
///
/// Callers creating items run this inside their own transaction.
pub(crate) fn upsert_history(
    conn: &Connection,
    name: &str,
    section_uuid: Option<SectionId>,
    now: i64,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO item_history (uuid, name, last_section_uuid, usage_count, last_used_at)
         VALUES (?1, ?2, ?3, 1, ?4)
         ON CONFLICT (name) DO UPDATE SET
             usage_count = item_history.usage_count + 1,
             last_section_uuid = excluded.last_section_uuid,
             last_used_at = excluded.last_used_at;",
        params![
            Uuid::new_v4().to_string(),
            name,
            section_uuid.map(|id| id.to_string()),
            now,
        ],
    )?;
    debug!(
        "event=history_upsert module=repo status=ok has_section={}",
        section_uuid.is_some()
    );
    Ok(())
}

pub(crate) fn top_history_entries(
    conn: &Connection,
    limit: usize,
) -> RepoResult<Vec<HistoryEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let mut stmt = conn.prepare(&format!(
        "{HISTORY_SELECT_SQL}
         ORDER BY h.usage_count DESC, h.last_used_at DESC, h.rowid ASC
         LIMIT ?1;"
    ))?;
    let mut rows = stmt.query([limit])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(parse_history_row(row)?);
    }
    Ok(entries)
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryEntry> {
    let uuid_text: String = row.get("uuid")?;
    Ok(HistoryEntry {
        uuid: parse_uuid(&uuid_text, "item_history.uuid")?,
        name: row.get("name")?,
        last_section_uuid: parse_optional_uuid(
            row.get("last_section_uuid")?,
            "item_history.last_section_uuid",
        )?,
        last_section_name: row.get("last_section_name")?,
        usage_count: row.get("usage_count")?,
        last_used_at: row.get("last_used_at")?,
    })
}
