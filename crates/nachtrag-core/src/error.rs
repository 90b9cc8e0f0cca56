// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Nachtrag.

use thiserror::Error;

/// Top-level error type for all Nachtrag operations.
#[derive(Debug, Error)]
pub enum NachtragError {
    // -- Object graph --
    #[error("not found: {0}")]
    NotFound(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    // -- Writing --
    #[error("PDF write error: {0}")]
    Write(String),

    // -- Reading --
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("invalid PDF date: {0}")]
    DateParse(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    // -- Integrity --
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NachtragError {
    /// Shorthand for a [`NachtragError::NotFound`] with a formatted message.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for lookup failures, which callers often treat as "absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NachtragError>;
