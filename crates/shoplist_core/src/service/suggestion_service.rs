//! Suggestion use-case service.
//!
//! # Responsibility
//! - Answer autocomplete queries from item history.
//! - Expose history management for callers that prune suggestions.
//!
//! # Invariants
//! - A query that is blank after trim runs bulk mode: most used names, no
//!   scoring.
//! - Query mode scores only the bounded candidate pool.

use super::error::{normalize_name, ServiceResult, ITEM_NAME_MAX_CHARS};
use crate::model::history::{HistoryEntry, HistoryId, Suggestion};
use crate::model::section::SectionId;
use crate::repo::HistoryRepository;
use crate::suggest::{
    effective_limit, rank_candidates, CANDIDATE_POOL_LIMIT, DEFAULT_BULK_LIMIT,
    DEFAULT_QUERY_LIMIT,
};
use log::debug;
use std::time::Instant;

/// Number of entries returned by [`SuggestionService::history_entries`].
pub const HISTORY_PAGE_LIMIT: usize = 100;

/// Suggestion service facade over history repositories.
pub struct SuggestionService<R: HistoryRepository> {
    repo: R,
}

impl<R: HistoryRepository> SuggestionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Ranked suggestions for `query`.
    ///
    /// # Contract
    /// - Blank query: up to `limit` (default 100) names by usage then recency.
    /// - Otherwise: up to `limit` (default 10) matches by score then usage.
    /// - Absent or non-positive `limit` uses the mode default.
    pub fn suggest(&self, query: &str, limit: Option<i64>) -> ServiceResult<Vec<Suggestion>> {
        let started_at = Instant::now();
        let query = query.trim();

        if query.is_empty() {
            let limit = effective_limit(limit, DEFAULT_BULK_LIMIT);
            let suggestions = self
                .repo
                .top_entries(limit)?
                .into_iter()
                .map(Suggestion::from)
                .collect::<Vec<_>>();
            debug!(
                "event=suggest_query module=service status=ok mode=bulk returned={} duration_ms={}",
                suggestions.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(suggestions);
        }

        let limit = effective_limit(limit, DEFAULT_QUERY_LIMIT);
        let candidates = self.repo.top_entries(CANDIDATE_POOL_LIMIT)?;
        let candidate_count = candidates.len();
        let suggestions = rank_candidates(candidates, query, limit);
        debug!(
            "event=suggest_query module=service status=ok mode=query query_len={} candidates={candidate_count} returned={} duration_ms={}",
            query.chars().count(),
            suggestions.len(),
            started_at.elapsed().as_millis()
        );
        Ok(suggestions)
    }

    /// Records one use of a name outside item creation.
    pub fn record_use(
        &self,
        name: &str,
        section_uuid: Option<SectionId>,
    ) -> ServiceResult<HistoryEntry> {
        let name = normalize_name("item name", name, ITEM_NAME_MAX_CHARS)?;
        Ok(self.repo.record_use(&name, section_uuid)?)
    }

    pub fn history_entries(&self) -> ServiceResult<Vec<HistoryEntry>> {
        Ok(self.repo.top_entries(HISTORY_PAGE_LIMIT)?)
    }

    pub fn delete_entry(&self, id: HistoryId) -> ServiceResult<()> {
        Ok(self.repo.delete_entry(id)?)
    }

    /// Empty input is a no-op returning `0`.
    pub fn delete_entries(&self, ids: &[HistoryId]) -> ServiceResult<usize> {
        Ok(self.repo.delete_entries(ids)?)
    }
}
