// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Thresholds;

/// Runtime settings for the folder slicer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// Directory watched for incoming documents. Must exist at startup.
    pub watch_dir: PathBuf,
    /// Byte budget per output slice (default 15 MiB).
    pub size_threshold: u64,
    /// Character budget per output slice (default 60 000).
    pub char_threshold: usize,
    /// Debounce window applied to file-creation events, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("."),
            size_threshold: 15 * 1024 * 1024,
            char_threshold: 60_000,
            debounce_ms: 500,
        }
    }
}

impl SlicerConfig {
    /// The two per-slice budgets as one value, the form the engine consumes.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            bytes: self.size_threshold,
            chars: self.char_threshold,
        }
    }

    /// Load a config from a JSON file. `None` if the file is absent or
    /// malformed — callers fall back to defaults.
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Persist the config as pretty JSON.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
