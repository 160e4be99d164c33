//! Error types for storefeed.
//!
//! This module defines the error taxonomy using `thiserror` for structured error handling.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the binary, wrapping every fatal failure
//!   - [`ConfigError`](crate::config::ConfigError) - config file read/parse failures
//!   - [`SettingsError`](crate::config::SettingsError) - listing settings that cannot be normalised
//!   - [`LoggingError`](crate::logging::LoggingError) - log file setup failures
//!   - [`FetchError`] - collaborator store failures
//!
//! # Recovery Strategy
//!
//! Fetch failures are **non-fatal** inside the engine: the failed load clears its
//! in-flight flag, the window keeps its previous items and exposes `has_error`, and
//! the next reconciliation (user navigation or an explicit retry) re-attempts.
//!
//! Two conditions look like errors but are not:
//! - a stale completion (its filter key no longer matches) is silently discarded;
//! - a page beyond the end of an exhausted feed resolves to a short or empty window.

use crate::config::{ConfigError, SettingsError};
use crate::logging::LoggingError;
use crate::model::filter::{InvalidPageNumber, InvalidPageSize};
use std::fmt;
use thiserror::Error;

/// Top-level application error encompassing all fatal failure modes.
///
/// Domain-specific errors convert via `From`, so `?` works throughout `main`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listing settings could not be normalised.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// A fetch failed where the caller cannot fall back to a previous window.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A page number argument was zero.
    #[error(transparent)]
    PageNumber(#[from] InvalidPageNumber),

    /// A page size argument was zero.
    #[error(transparent)]
    PageSize(#[from] InvalidPageSize),
}

/// Which collaborator call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOperation {
    /// Cursor-paginated query.
    CursorPage,
    /// Direct `limit/offset` query.
    OffsetWindow,
    /// Category count query.
    TotalCount,
}

impl fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchOperation::CursorPage => "cursor page query",
            FetchOperation::OffsetWindow => "offset query",
            FetchOperation::TotalCount => "count query",
        };
        f.write_str(name)
    }
}

/// Failure reported by a collaborator query.
///
/// Every variant is transient from the engine's point of view: state is left as
/// it was before the load started, and a later reconciliation retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network or backend failure.
    ///
    /// **Recovery**: the engine surfaces `has_error`, keeps the previous window and
    /// retries on the next user action or explicit retry.
    #[error("{operation} failed: {reason}")]
    Transient {
        /// The failed call.
        operation: FetchOperation,
        /// Backend-provided detail.
        reason: String,
    },

    /// The store did not recognise a continuation token it issued earlier
    /// (for example after a backend restart).
    #[error("{operation} rejected continuation token {token:?}")]
    InvalidCursor {
        /// The failed call.
        operation: FetchOperation,
        /// The rejected token.
        token: String,
    },

    /// The collaborator task ended without producing a result.
    #[error("{operation} was abandoned before completing")]
    Abandoned {
        /// The abandoned call.
        operation: FetchOperation,
    },
}

impl FetchError {
    /// Convenience constructor for [`FetchError::Transient`].
    pub fn transient(operation: FetchOperation, reason: impl Into<String>) -> Self {
        Self::Transient {
            operation,
            reason: reason.into(),
        }
    }

    /// The failed call.
    pub fn operation(&self) -> FetchOperation {
        match self {
            FetchError::Transient { operation, .. }
            | FetchError::InvalidCursor { operation, .. }
            | FetchError::Abandoned { operation } => *operation,
        }
    }
}
