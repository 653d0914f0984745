//! Connection readiness checks run by repository constructors.

use super::error::{RepoError, RepoResult};
use crate::db::migrations::latest_version;
use rusqlite::Connection;

/// Table plus the columns a repository reads or writes.
pub(crate) struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const LISTS: TableSpec = TableSpec {
    name: "lists",
    columns: &[
        "uuid",
        "name",
        "icon",
        "sort_order",
        "is_active",
        "created_at",
        "updated_at",
    ],
};

pub(crate) const SECTIONS: TableSpec = TableSpec {
    name: "sections",
    columns: &[
        "uuid",
        "list_uuid",
        "name",
        "sort_order",
        "created_at",
        "updated_at",
    ],
};

pub(crate) const ITEMS: TableSpec = TableSpec {
    name: "items",
    columns: &[
        "uuid",
        "section_uuid",
        "name",
        "description",
        "completed",
        "uncertain",
        "sort_order",
        "created_at",
        "updated_at",
    ],
};

pub(crate) const ITEM_HISTORY: TableSpec = TableSpec {
    name: "item_history",
    columns: &[
        "uuid",
        "name",
        "last_section_uuid",
        "usage_count",
        "last_used_at",
    ],
};

pub(crate) const TEMPLATES: TableSpec = TableSpec {
    name: "templates",
    columns: &[
        "uuid",
        "name",
        "description",
        "sort_order",
        "created_at",
        "updated_at",
    ],
};

pub(crate) const TEMPLATE_ITEMS: TableSpec = TableSpec {
    name: "template_items",
    columns: &[
        "uuid",
        "template_uuid",
        "section_name",
        "name",
        "description",
        "sort_order",
        "created_at",
    ],
};

/// Verifies migration version and table shapes before a repository is used.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[&TableSpec]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table.name)? {
            return Err(RepoError::MissingRequiredTable(table.name));
        }
        let present = table_columns(conn, table.name)?;
        for column in table.columns.iter().copied() {
            if !present.iter().any(|name| name.as_str() == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: table.name,
                    column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
