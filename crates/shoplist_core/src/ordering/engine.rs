//! SQL implementation of the ordering operations.

use super::group::{OrderedKind, SiblingGroup};
use super::plan::{cross_container_target, dense_insertion};
use crate::clock::SharedClock;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::rows::{parse_optional_uuid, parse_uuid};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior,
};
use std::time::Instant;
use uuid::Uuid;

/// Direction for swap-adjacent moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards smaller `sort_order`.
    Up,
    /// Towards larger `sort_order`.
    Down,
}

impl MoveDirection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Result of a swap-adjacent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Orders were exchanged with the given neighbor.
    Swapped { neighbor: Uuid },
    /// Entity already sits at the extreme; nothing changed.
    AtBoundary,
}

/// Current group membership and order of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub group: SiblingGroup,
    pub sort_order: i64,
}

/// Transactional entry point for ordering operations.
///
/// Each method opens its own IMMEDIATE transaction, so it must not be called
/// while another transaction is open on the same connection.
pub struct OrderingEngine<'conn> {
    conn: &'conn Connection,
    clock: SharedClock,
}

impl<'conn> OrderingEngine<'conn> {
    pub fn new(conn: &'conn Connection, clock: SharedClock) -> Self {
        Self { conn, clock }
    }

    /// Swaps `sort_order` with the nearest smaller (`Up`) or larger (`Down`)
    /// sibling. Returns [`MoveOutcome::AtBoundary`] at the extremes.
    pub fn move_adjacent(
        &self,
        kind: OrderedKind,
        id: Uuid,
        direction: MoveDirection,
    ) -> RepoResult<MoveOutcome> {
        let started_at = Instant::now();
        let result = self.in_transaction(|tx, now| swap_adjacent(tx, kind, id, direction, now));
        match &result {
            Ok(outcome) => debug!(
                "event=ordering_move module=ordering status=ok kind={} direction={} boundary={} duration_ms={}",
                kind.table(),
                direction.as_str(),
                matches!(outcome, MoveOutcome::AtBoundary),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("ordering_move", kind, err),
        }
        result
    }

    /// Moves an entity to `position` among its container's positional
    /// participants and renumbers them densely.
    pub fn relocate_within(&self, kind: OrderedKind, id: Uuid, position: i64) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.in_transaction(|tx, now| relocate_within_tx(tx, kind, id, position, now));
        match &result {
            Ok(()) => debug!(
                "event=ordering_reorder module=ordering status=ok kind={} position={position} duration_ms={}",
                kind.table(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("ordering_reorder", kind, err),
        }
        result
    }

    /// Moves an entity into `container` at `position` using shift-and-insert.
    ///
    /// Degrades to [`OrderingEngine::relocate_within`] semantics when the
    /// entity already lives in `container`. Returns the assigned order.
    pub fn relocate_to(
        &self,
        kind: OrderedKind,
        id: Uuid,
        container: Uuid,
        position: i64,
    ) -> RepoResult<i64> {
        let started_at = Instant::now();
        let result = self.in_transaction(|tx, now| {
            relocate_across_tx(tx, kind, id, container, position, now)
        });
        match &result {
            Ok(order) => debug!(
                "event=ordering_relocate module=ordering status=ok kind={} position={position} sort_order={order} duration_ms={}",
                kind.table(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("ordering_relocate", kind, err),
        }
        result
    }

    /// Moves an entity to the end of `container`. Returns the assigned order.
    pub fn append_to(&self, kind: OrderedKind, id: Uuid, container: Uuid) -> RepoResult<i64> {
        let result = self.in_transaction(|tx, now| append_to_tx(tx, kind, id, container, now));
        if let Err(err) = &result {
            log_failure("ordering_append", kind, err);
        }
        result
    }

    /// All siblings of a group in `sort_order` (ties by insertion order).
    pub fn sibling_orders(&self, group: SiblingGroup) -> RepoResult<Vec<(Uuid, i64)>> {
        list_siblings(self.conn, group, false, None)
    }

    fn in_transaction<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: FnOnce(&Transaction<'_>, i64) -> RepoResult<T>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = op(&tx, self.clock.now())?;
        tx.commit()?;
        Ok(value)
    }
}

fn log_failure(event: &str, kind: OrderedKind, err: &RepoError) {
    warn!(
        "event={event} module=ordering status=error kind={} error={err}",
        kind.table()
    );
}

/// Locates one entity; fails with not-found when it does not exist.
pub(crate) fn locate(conn: &Connection, kind: OrderedKind, id: Uuid) -> RepoResult<Placement> {
    let container_expr = kind.container_column().unwrap_or("NULL");
    let row: Option<(Option<String>, i64)> = conn
        .query_row(
            &format!(
                "SELECT {container_expr}, sort_order FROM {} WHERE uuid = ?1;",
                kind.table()
            ),
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (container, sort_order) =
        row.ok_or_else(|| RepoError::not_found(kind.entity_kind(), id))?;
    let container = parse_optional_uuid(container, "container uuid")?;
    Ok(Placement {
        group: SiblingGroup::of(kind, container),
        sort_order,
    })
}

/// Maximum `sort_order` over every sibling of a group.
pub(crate) fn max_sort_order(conn: &Connection, group: SiblingGroup) -> RepoResult<Option<i64>> {
    let (scope, binds) = group.scope();
    let max = conn.query_row(
        &format!(
            "SELECT MAX(sort_order) FROM {} WHERE {scope};",
            group.kind().table()
        ),
        params_from_iter(binds),
        |row| row.get(0),
    )?;
    Ok(max)
}

/// Order value for a newly appended sibling: `max + 1`, or `0` when empty.
///
/// Must run in the same transaction as the insert that uses it.
pub(crate) fn next_sort_order(conn: &Connection, group: SiblingGroup) -> RepoResult<i64> {
    Ok(max_sort_order(conn, group)?.map_or(0, |max| max + 1))
}

fn list_siblings(
    conn: &Connection,
    group: SiblingGroup,
    positional_only: bool,
    exclude: Option<Uuid>,
) -> RepoResult<Vec<(Uuid, i64)>> {
    let kind = group.kind();
    let (scope, mut binds) = group.scope();
    let mut sql = format!("SELECT uuid, sort_order FROM {} WHERE {scope}", kind.table());
    if positional_only {
        sql.push_str(" AND ");
        sql.push_str(kind.positional_filter());
    }
    if let Some(exclude) = exclude {
        sql.push_str(" AND uuid <> ?");
        binds.push(Value::Text(exclude.to_string()));
    }
    sql.push_str(" ORDER BY sort_order ASC, rowid ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut siblings = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        siblings.push((parse_uuid(&id_text, "uuid")?, row.get(1)?));
    }
    Ok(siblings)
}

fn write_order(
    conn: &Connection,
    kind: OrderedKind,
    id: Uuid,
    sort_order: i64,
    touched_at: Option<i64>,
) -> RepoResult<()> {
    let table = kind.table();
    match touched_at.filter(|_| kind.tracks_updates()) {
        Some(now) => conn.execute(
            &format!("UPDATE {table} SET sort_order = ?2, updated_at = ?3 WHERE uuid = ?1;"),
            params![id.to_string(), sort_order, now],
        )?,
        None => conn.execute(
            &format!("UPDATE {table} SET sort_order = ?2 WHERE uuid = ?1;"),
            params![id.to_string(), sort_order],
        )?,
    };
    Ok(())
}

fn write_placement(
    conn: &Connection,
    kind: OrderedKind,
    id: Uuid,
    container_column: &str,
    container: Uuid,
    sort_order: i64,
    now: i64,
) -> RepoResult<()> {
    let table = kind.table();
    if kind.tracks_updates() {
        conn.execute(
            &format!(
                "UPDATE {table}
                 SET {container_column} = ?2, sort_order = ?3, updated_at = ?4
                 WHERE uuid = ?1;"
            ),
            params![id.to_string(), container.to_string(), sort_order, now],
        )?;
    } else {
        conn.execute(
            &format!(
                "UPDATE {table}
                 SET {container_column} = ?2, sort_order = ?3
                 WHERE uuid = ?1;"
            ),
            params![id.to_string(), container.to_string(), sort_order],
        )?;
    }
    Ok(())
}

fn ensure_container_exists(
    conn: &Connection,
    kind: OrderedKind,
    container: Uuid,
) -> RepoResult<()> {
    let (Some(table), Some(container_kind)) = (kind.container_table(), kind.container_kind())
    else {
        return Err(uncontained(kind));
    };
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1);"),
        [container.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::not_found(container_kind, container))
    }
}

fn uncontained(kind: OrderedKind) -> RepoError {
    RepoError::ConstraintViolation(format!(
        "{} rows are ordered globally and have no container",
        kind.entity_kind()
    ))
}

pub(crate) fn swap_adjacent(
    conn: &Connection,
    kind: OrderedKind,
    id: Uuid,
    direction: MoveDirection,
    now: i64,
) -> RepoResult<MoveOutcome> {
    let placement = locate(conn, kind, id)?;
    let (scope, mut binds) = placement.group.scope();
    let (comparison, ordering) = match direction {
        MoveDirection::Up => ("<", "DESC"),
        MoveDirection::Down => (">", "ASC"),
    };
    binds.push(Value::Integer(placement.sort_order));

    let neighbor: Option<(String, i64)> = conn
        .query_row(
            &format!(
                "SELECT uuid, sort_order
                 FROM {}
                 WHERE {scope} AND sort_order {comparison} ?
                 ORDER BY sort_order {ordering}, rowid {ordering}
                 LIMIT 1;",
                kind.table()
            ),
            params_from_iter(binds),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((neighbor_text, neighbor_order)) = neighbor else {
        return Ok(MoveOutcome::AtBoundary);
    };
    let neighbor = parse_uuid(&neighbor_text, "uuid")?;

    write_order(conn, kind, neighbor, placement.sort_order, None)?;
    write_order(conn, kind, id, neighbor_order, Some(now))?;
    Ok(MoveOutcome::Swapped { neighbor })
}

pub(crate) fn relocate_within_tx(
    conn: &Connection,
    kind: OrderedKind,
    id: Uuid,
    position: i64,
    now: i64,
) -> RepoResult<()> {
    let placement = locate(conn, kind, id)?;
    let others = list_siblings(conn, placement.group, true, Some(id))?;
    let other_ids = others.iter().map(|(other, _)| *other).collect::<Vec<_>>();

    for (entry, sort_order) in dense_insertion(&other_ids, id, position) {
        let touched_at = (entry == id).then_some(now);
        write_order(conn, kind, entry, sort_order, touched_at)?;
    }
    Ok(())
}

pub(crate) fn relocate_across_tx(
    conn: &Connection,
    kind: OrderedKind,
    id: Uuid,
    container: Uuid,
    position: i64,
    now: i64,
) -> RepoResult<i64> {
    let container_column = kind.container_column().ok_or_else(|| uncontained(kind))?;
    let placement = locate(conn, kind, id)?;
    ensure_container_exists(conn, kind, container)?;

    if placement.group.container() == Some(container) {
        relocate_within_tx(conn, kind, id, position, now)?;
        return Ok(locate(conn, kind, id)?.sort_order);
    }

    let destination = SiblingGroup::of(kind, Some(container));
    let participant_orders = list_siblings(conn, destination, true, None)?
        .into_iter()
        .map(|(_, sort_order)| sort_order)
        .collect::<Vec<_>>();
    let max_any = max_sort_order(conn, destination)?;
    let target = cross_container_target(&participant_orders, max_any, position);

    let (scope, mut binds) = destination.scope();
    binds.push(Value::Integer(target));
    conn.execute(
        &format!(
            "UPDATE {}
             SET sort_order = sort_order + 1
             WHERE {scope} AND sort_order >= ?;",
            kind.table()
        ),
        params_from_iter(binds),
    )?;

    write_placement(conn, kind, id, container_column, container, target, now)?;
    Ok(target)
}

pub(crate) fn append_to_tx(
    conn: &Connection,
    kind: OrderedKind,
    id: Uuid,
    container: Uuid,
    now: i64,
) -> RepoResult<i64> {
    let container_column = kind.container_column().ok_or_else(|| uncontained(kind))?;
    locate(conn, kind, id)?;
    ensure_container_exists(conn, kind, container)?;

    let target = next_sort_order(conn, SiblingGroup::of(kind, Some(container)))?;
    write_placement(conn, kind, id, container_column, container, target, now)?;
    Ok(target)
}
