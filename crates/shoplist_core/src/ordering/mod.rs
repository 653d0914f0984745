//! Ordering engine for every sibling group in the store.
//!
//! # Responsibility
//! - Keep `sort_order` consistent for lists, sections within a list, items
//!   within a section, templates and template items.
//! - Provide one implementation of append, swap-adjacent, relocate-within and
//!   relocate-across, parametrized by [`SiblingGroup`].
//!
//! # Invariants
//! - Every public operation runs in one IMMEDIATE transaction; a failure at
//!   any step leaves the store exactly as before.
//! - Swap-adjacent moves never assume contiguous values and never touch
//!   siblings other than the two swapped rows.
//! - Relocate-within renumbers positional participants densely `0..n`.
//! - Relocate-across shifts destination siblings at or above the target
//!   order by one and preserves all other gaps.
//! - For items only incomplete rows are positional participants; completed
//!   rows keep their values.

mod engine;
mod group;
pub mod plan;

pub use engine::{MoveDirection, MoveOutcome, OrderingEngine};
pub use group::{OrderedKind, SiblingGroup};

pub(crate) use engine::next_sort_order;
