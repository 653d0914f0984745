//! Core domain logic for the shopping-list manager.
//! This crate is the single source of truth for ordering, history and
//! suggestion invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;
pub mod suggest;

pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::history::{HistoryEntry, HistoryId, Suggestion};
pub use model::item::{Item, ItemId};
pub use model::list::{ListId, ListSummary, ShoppingList, DEFAULT_LIST_ICON};
pub use model::section::{ListTree, Section, SectionId, SectionWithItems};
pub use model::template::{Template, TemplateId, TemplateItem, TemplateItemId};
pub use model::{CompletionStats, EntityKind};
pub use ordering::{MoveDirection, MoveOutcome, OrderedKind, OrderingEngine, SiblingGroup};
pub use repo::{
    HistoryRepository, ItemRepository, ListRepository, RepoError, RepoResult, SectionRepository,
    SqliteHistoryRepository, SqliteItemRepository, SqliteListRepository, SqliteSectionRepository,
    SqliteTemplateRepository, TemplateRepository,
};
pub use service::{
    ItemService, ListService, SectionService, ServiceError, ServiceResult, SuggestionService,
    TemplateService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
