//! Service-level errors and input normalization.
//!
//! # Invariants
//! - Names are trimmed and must be non-blank; limits count characters.
//! - Icons are limited in bytes and fall back to the default icon when blank.

use crate::model::list::DEFAULT_LIST_ICON;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub const LIST_NAME_MAX_CHARS: usize = 100;
pub const LIST_ICON_MAX_BYTES: usize = 20;
pub const SECTION_NAME_MAX_CHARS: usize = 100;
pub const ITEM_NAME_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const TEMPLATE_NAME_MAX_CHARS: usize = 100;

/// Errors from service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Name is blank after trim.
    InvalidName { field: &'static str },
    /// Name exceeds its character limit.
    NameTooLong { field: &'static str, max: usize },
    /// Free-text field exceeds its limit.
    FieldTooLong { field: &'static str, max: usize },
    /// Repository-level failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_not_found())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName { field } => write!(f, "{field} must not be blank"),
            Self::NameTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::FieldTooLong { field, max } => write!(f, "{field} exceeds limit of {max}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Trims a required name and enforces its character limit.
pub(crate) fn normalize_name(
    field: &'static str,
    raw: &str,
    max_chars: usize,
) -> ServiceResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidName { field });
    }
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::NameTooLong {
            field,
            max: max_chars,
        });
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text; empty is allowed.
pub(crate) fn normalize_text(
    field: &'static str,
    raw: &str,
    max_chars: usize,
) -> ServiceResult<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::FieldTooLong {
            field,
            max: max_chars,
        });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_icon(raw: Option<&str>) -> ServiceResult<String> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Ok(DEFAULT_LIST_ICON.to_string());
    }
    if trimmed.len() > LIST_ICON_MAX_BYTES {
        return Err(ServiceError::FieldTooLong {
            field: "icon",
            max: LIST_ICON_MAX_BYTES,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_icon, normalize_name, normalize_text, ServiceError};

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(normalize_name("name", "  Milk ", 10).unwrap(), "Milk");
        assert!(matches!(
            normalize_name("name", "   ", 10),
            Err(ServiceError::InvalidName { field: "name" })
        ));
    }

    #[test]
    fn name_limit_counts_characters() {
        assert!(normalize_name("name", "äääää", 5).is_ok());
        assert!(matches!(
            normalize_name("name", "ääääää", 5),
            Err(ServiceError::NameTooLong { max: 5, .. })
        ));
    }

    #[test]
    fn text_may_be_empty() {
        assert_eq!(normalize_text("description", "  ", 5).unwrap(), "");
        assert!(normalize_text("description", "abcdef", 5).is_err());
    }

    #[test]
    fn blank_icon_falls_back_to_default() {
        assert_eq!(normalize_icon(None).unwrap(), "🛒");
        assert_eq!(normalize_icon(Some(" ")).unwrap(), "🛒");
        assert_eq!(normalize_icon(Some("🥦")).unwrap(), "🥦");
        assert!(normalize_icon(Some("🥦🥦🥦🥦🥦🥦")).is_err());
    }
}
