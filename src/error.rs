//! # Error Types
//!
//! This module defines error types used throughout the pallet-label library.
//!
//! ## Failure Scopes
//!
//! | Variant | Scope | Handling |
//! |---------|-------|----------|
//! | `Configuration`, `Template`, `Input` | whole run | abort before any row is rendered |
//! | `Record`, `Encoding`, `Export` | one row | row skipped and reported, batch continues |
//! | `Io` | depends on caller | reading inputs aborts, writing outputs is per-row |
//!
//! Font problems never surface here: see [`crate::font::FontError`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pallet-label operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Layout template is structurally or semantically invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Layout template is not parseable JSON or has mistyped fields
    #[error("Template error: {0}")]
    Template(#[from] serde_json::Error),

    /// Records file is not readable CSV, or not a JSON array or JSON Lines of objects
    #[error("Input error: {0}")]
    Input(String),

    /// Input row cannot be turned into a record (e.g. missing identifier)
    #[error("Record error: {0}")]
    Record(String),

    /// QR payload could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Output file could not be written
    #[error("Export error for {}: {message}", path.display())]
    Export { path: PathBuf, message: String },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    /// Whether this error is confined to the row that produced it.
    ///
    /// Row-fatal errors are collected into the batch report; everything else
    /// aborts the run.
    pub fn is_row_fatal(&self) -> bool {
        matches!(
            self,
            Self::Record(_) | Self::Encoding(_) | Self::Export { .. }
        )
    }

    pub(crate) fn export(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Export {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for pallet-label operations
pub type Result<T> = std::result::Result<T, LabelError>;
