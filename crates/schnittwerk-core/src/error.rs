// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Schnittwerk.

use thiserror::Error;

/// Top-level error type for all Schnittwerk operations.
#[derive(Debug, Error)]
pub enum SchnittwerkError {
    // -- Intake errors --
    #[error("source document unreadable: {0}")]
    UnreadableSource(String),

    #[error("page {page} could not be measured: {reason}")]
    UnmeasurablePage { page: u32, reason: String },

    #[error("conversion failed: {0}")]
    Conversion(String),

    // -- Output errors --
    #[error("slice could not be written: {0}")]
    SliceWrite(String),

    #[error("could not delete {path}: {reason}")]
    Deletion { path: String, reason: String },

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Watching / startup --
    #[error("watch directory does not exist: {0}")]
    WatchDirMissing(String),

    #[error("file watcher error: {0}")]
    Watch(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SchnittwerkError>;
