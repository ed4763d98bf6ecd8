//! Unified error types for crowdstore.
//!
//! Every backend maps its failures into [`AppError`] so callers can match on
//! [`ErrorKind`] and decide on their own retry policy. Nothing in crowdstore
//! retries internally.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across all crowdstore crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A save path does not follow the `action/job/unit/filename` convention.
    MalformedPath,
    /// The document store could not be reached, or answered with a 5xx.
    StoreUnavailable,
    /// The store rejected a write because the revision did not match.
    StoreConflict,
    /// Cleanup was attempted before the lookup view was installed.
    ViewMissing,
    /// Some deletes failed during cleanup; see [`AppError::failed_ids`].
    PartialCleanup,
    /// The store answered with a status or body this client does not understand.
    UnexpectedResponse,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A local storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPath => write!(f, "MALFORMED_PATH"),
            Self::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            Self::StoreConflict => write!(f, "STORE_CONFLICT"),
            Self::ViewMissing => write!(f, "VIEW_MISSING"),
            Self::PartialCleanup => write!(f, "PARTIAL_CLEANUP"),
            Self::UnexpectedResponse => write!(f, "UNEXPECTED_RESPONSE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout crowdstore.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Document ids that could not be deleted (only set for `PartialCleanup`).
    pub failed_ids: Vec<String>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            failed_ids: Vec::new(),
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
            failed_ids: Vec::new(),
        }
    }

    /// Create a malformed-path error.
    pub fn malformed_path(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPath, message)
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Create a store-conflict error.
    pub fn store_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreConflict, message)
    }

    /// Create a view-missing error.
    pub fn view_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ViewMissing, message)
    }

    /// Create a partial-cleanup error listing the documents that were not deleted.
    pub fn partial_cleanup(message: impl Into<String>, failed_ids: Vec<String>) -> Self {
        Self {
            failed_ids,
            ..Self::new(ErrorKind::PartialCleanup, message)
        }
    }

    /// Create an unexpected-response error.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedResponse, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
            failed_ids: self.failed_ids.clone(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::with_source(
            ErrorKind::StoreUnavailable,
            format!("Document store request failed: {err}"),
            err,
        )
    }
}
