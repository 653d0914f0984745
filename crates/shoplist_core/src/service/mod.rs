//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate repository calls.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository transactions or the ordering engine.

pub mod error;
pub mod item_service;
pub mod list_service;
pub mod section_service;
pub mod suggestion_service;
pub mod template_service;

pub use error::{ServiceError, ServiceResult};
pub use item_service::ItemService;
pub use list_service::ListService;
pub use section_service::SectionService;
pub use suggestion_service::SuggestionService;
pub use template_service::TemplateService;
