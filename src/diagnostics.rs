//! Fixture-level errors.
//!
//! Every failure that happens before a case starts running is a
//! [`HarnessError`]. These are `miette` diagnostics: malformed fixtures carry
//! the fixture text and the span the YAML parser pointed at, so the CLI can
//! render them with a source snippet.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Coarse classification of a [`HarnessError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The fixture path did not resolve to a file.
    NotFound,
    /// The fixture exists but could not be read.
    Io,
    /// The fixture is not valid YAML for the case schema.
    Malformed,
    /// The fixture parsed, but one of its cases is inconsistent.
    InvalidCase,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NotFound => "not-found",
            ErrorType::Io => "io",
            ErrorType::Malformed => "malformed",
            ErrorType::InvalidCase => "invalid-case",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("fixture not found: {path} (looked at {})", .resolved.display())]
    #[diagnostic(
        code(sqlcase::fixture::not_found),
        help("fixture paths resolve against the case root; pass --root or set SQLCASE_ROOT")
    )]
    NotFound { path: String, resolved: PathBuf },

    #[error("failed to read fixture {path}")]
    #[diagnostic(code(sqlcase::fixture::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fixture {path}: {message}")]
    #[diagnostic(code(sqlcase::fixture::malformed))]
    Malformed {
        path: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("invalid case '{case}' in {path}: {message}")]
    #[diagnostic(code(sqlcase::fixture::invalid_case))]
    InvalidCase {
        path: String,
        case: String,
        message: String,
    },
}

impl HarnessError {
    /// Builds a `Malformed` error from a YAML parse failure over `content`.
    pub fn malformed(path: impl Into<String>, content: &str, err: serde_yaml::Error) -> Self {
        let path = path.into();
        let span = err
            .location()
            .map(|loc| SourceSpan::from((loc.index().min(content.len()), 1)));
        HarnessError::Malformed {
            src: NamedSource::new(path.clone(), content.to_string()),
            path,
            message: err.to_string(),
            span,
        }
    }

    /// A `Malformed` error for a document that parsed but holds nothing to run.
    pub fn unusable(path: impl Into<String>, content: &str, message: impl Into<String>) -> Self {
        let path = path.into();
        HarnessError::Malformed {
            src: NamedSource::new(path.clone(), content.to_string()),
            path,
            message: message.into(),
            span: None,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            HarnessError::NotFound { .. } => ErrorType::NotFound,
            HarnessError::Io { .. } => ErrorType::Io,
            HarnessError::Malformed { .. } => ErrorType::Malformed,
            HarnessError::InvalidCase { .. } => ErrorType::InvalidCase,
        }
    }

    /// The fixture path the error is about, as it was requested.
    pub fn path(&self) -> &str {
        match self {
            HarnessError::NotFound { path, .. }
            | HarnessError::Io { path, .. }
            | HarnessError::Malformed { path, .. }
            | HarnessError::InvalidCase { path, .. } => path,
        }
    }
}
