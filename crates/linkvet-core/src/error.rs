//! Error types and handling for linkvet-core operations.
//!
//! All public functions in linkvet-core return [`Result<T>`] with a single
//! [`Error`] enum. Per-URL network failures are *not* represented here: the
//! checker records those inside [`crate::CheckResult`] and keeps going. An
//! `Error` surfacing from the pipeline means the run itself could not
//! continue (unreadable file, malformed document in strict mode, resource
//! exhaustion).

use thiserror::Error;

/// The main error type for linkvet-core operations.
///
/// ## Display vs Debug
///
/// - `Display` provides user-friendly, single-line error messages
/// - `Debug` includes the full source chain for diagnostics
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading input documents from disk. The underlying
    /// `std::io::Error` is preserved for detailed inspection.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed outside of a per-URL check.
    ///
    /// Covers HTTP client construction. Failures while probing an
    /// individual URL never surface here; they become `Error`-status
    /// results instead.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A document could not be parsed.
    ///
    /// Raised only in strict mode; otherwise malformed documents yield an
    /// empty link list. Carries the offending path and the parser's cause.
    #[error("Parse error in '{path}': {reason}")]
    Parse {
        /// Path of the document that failed to parse.
        path: String,
        /// Parser-reported cause.
        reason: String,
    },

    /// No extractor is registered for a file's extension.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// An ignore rule could not be compiled.
    ///
    /// Raised when building an [`crate::IgnoreFilter`] from user-supplied
    /// glob or regex patterns.
    #[error("Invalid ignore rule '{rule}': {reason}")]
    InvalidRule {
        /// The rule text as supplied.
        rule: String,
        /// Why it failed to compile.
        reason: String,
    },

    /// The runtime could not schedule more work.
    ///
    /// The only fatal condition inside the checker. Individual URL
    /// failures are recorded per result and never raise this.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

/// Convenient result alias used throughout linkvet-core.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a short category name for this error, for logging and
    /// report grouping.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse { .. } => "parse",
            Self::UnsupportedFormat(_) => "unsupported",
            Self::InvalidRule { .. } => "rule",
            Self::ResourceExhausted(_) => "resource",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_includes_path_and_reason() {
        let err = Error::Parse {
            path: "docs/a.json".to_string(),
            reason: "expected value at line 3".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docs/a.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_categories_are_stable() {
        assert_eq!(
            Error::UnsupportedFormat(".xyz".to_string()).category(),
            "unsupported"
        );
        assert_eq!(
            Error::ResourceExhausted("worker".to_string()).category(),
            "resource"
        );
    }
}
