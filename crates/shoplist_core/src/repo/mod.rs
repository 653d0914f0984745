//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Constructors verify migration version and table shape before use.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `ConstraintViolation`) in addition to DB transport errors.
//! - Every positional change goes through [`crate::ordering`].

pub mod error;
pub mod history_repo;
pub mod item_repo;
pub mod list_repo;
pub(crate) mod rows;
pub(crate) mod schema;
pub mod section_repo;
pub mod template_repo;

pub use error::{RepoError, RepoResult};
pub use history_repo::{HistoryRepository, SqliteHistoryRepository};
pub use item_repo::{ItemRepository, SqliteItemRepository};
pub use list_repo::{ListRepository, SqliteListRepository};
pub use section_repo::{SectionRepository, SqliteSectionRepository};
pub use template_repo::{SqliteTemplateRepository, TemplateRepository};
