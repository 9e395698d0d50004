//! Error types for Pressroom.
//!
//! Library crates use [`PressroomError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Pressroom operations.
#[derive(Debug, thiserror::Error)]
pub enum PressroomError {
    /// No article is stored under the requested slug.
    #[error("article not found: {slug}")]
    NotFound { slug: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// An article document could not be parsed.
    #[error("parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Content that parsed but breaks an authoring rule (duplicate slug, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON/TOML encoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PressroomError>;

impl PressroomError {
    /// Create a not-found error for a slug.
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for the document at `path`.
    pub fn parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a lookup miss rather than a content or system fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PressroomError::not_found("responsive-navbar");
        assert_eq!(err.to_string(), "article not found: responsive-navbar");
        assert!(err.is_not_found());

        let err = PressroomError::validation("duplicate slug 'intro'");
        assert!(err.to_string().contains("duplicate slug"));
        assert!(!err.is_not_found());

        let err = PressroomError::parse("content/a.md", "missing header");
        assert!(err.to_string().contains("a.md"));
        assert!(err.to_string().contains("missing header"));
    }
}
