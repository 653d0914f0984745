//! Suggestion engine: ranking of previously used item names.
//!
//! # Responsibility
//! - Score history candidates against a typed query.
//! - Resolve result limits for query and bulk modes.
//!
//! # Invariants
//! - Matching is case-insensitive everywhere.
//! - Only the [`CANDIDATE_POOL_LIMIT`] most used history rows are scored.
//!   Entries outside that pool are never suggested in query mode, even on an
//!   exact match.
//! - Usage boosts reorder matches but never turn a non-match into a match.

pub mod scoring;

pub use scoring::{base_score, edit_distance, rank_candidates};

/// Number of history rows prefetched (by usage, then recency) for scoring.
pub const CANDIDATE_POOL_LIMIT: usize = 200;
/// Result count for query mode when the caller gives none or a non-positive one.
pub const DEFAULT_QUERY_LIMIT: usize = 10;
/// Result count for bulk mode (empty query) under the same rule.
pub const DEFAULT_BULK_LIMIT: usize = 100;

/// Resolves a caller-supplied limit; absent or non-positive means `default`.
pub fn effective_limit(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(value) if value > 0 => usize::try_from(value).unwrap_or(usize::MAX),
        _ => default,
    }
}
