// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The intake pipeline — carries one arriving file from discovery to a
// terminal state: skipped, or sliced with its source removed.
//
// Strictly sequential: the caller feeds one path at a time and the whole
// pipeline for it runs to completion (or to an unrecovered failure) before
// the next. The one ordering guarantee throughout is that no source artifact
// is deleted before every slice of its pass has been written.

use std::path::{Path, PathBuf};

use schnittwerk_core::error::{Result, SchnittwerkError};
use schnittwerk_core::{DocumentKind, SliceRecord, SlicerConfig};
use schnittwerk_document::{DocumentConverter, PdfReader, office};
use tracing::{debug, info, instrument, warn};

use crate::classify;
use crate::measure::PdfPageMeasurer;
use crate::packer::{self, FsSliceSink};

/// Terminal state of one intake run.
#[derive(Debug)]
pub enum IntakeOutcome {
    /// Extension not handled; nothing was done.
    Unsupported,
    /// Under both budgets; the file was left untouched.
    UnderThreshold,
    /// The document was split; sources were removed after the slices were
    /// durably written.
    Sliced(Vec<SliceRecord>),
}

/// Per-file orchestration: measure → classify → convert → pack → clean up.
#[derive(Clone)]
pub struct IntakeController {
    config: SlicerConfig,
}

impl IntakeController {
    pub fn new(config: SlicerConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline for one file.
    ///
    /// Errors abort this file only; the caller logs them and keeps watching.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn process(&self, path: &Path) -> Result<IntakeOutcome> {
        let Some(kind) = DocumentKind::from_path(path) else {
            debug!("Unsupported extension — ignoring");
            return Ok(IntakeOutcome::Unsupported);
        };

        info!("Processing file");

        let byte_size = std::fs::metadata(path)
            .map_err(|err| {
                SchnittwerkError::UnreadableSource(format!("{}: {}", path.display(), err))
            })?
            .len();
        let char_count = office::count_chars(path, kind)?;

        let limits = self.config.thresholds();
        info!(
            size_mb = byte_size as f64 / 1024.0 / 1024.0,
            chars = char_count,
            size_limit_mb = limits.bytes as f64 / 1024.0 / 1024.0,
            char_limit = limits.chars,
            "Checking thresholds"
        );

        if !classify::needs_splitting(byte_size, char_count, &limits) {
            info!("Document does not exceed thresholds — skipping");
            return Ok(IntakeOutcome::UnderThreshold);
        }

        // Only page-addressable documents can be sliced; everything else is
        // converted first.
        let artifact: PathBuf = if kind.is_page_addressable() {
            path.to_path_buf()
        } else {
            info!("Document exceeds thresholds — converting to PDF");
            DocumentConverter::to_pdf(path, kind)?
        };

        let reader = PdfReader::open(&artifact)
            .map_err(|err| SchnittwerkError::UnreadableSource(err.to_string()))?;
        let measurer = PdfPageMeasurer::new(&reader);
        let mut sink = FsSliceSink::new(&reader, &artifact);
        let slices = packer::pack(&measurer, &mut sink, &limits)?;

        if slices.is_empty() {
            // Classification said split, but the pass never flushed — nothing
            // was written, so nothing may be deleted.
            warn!("Packing pass produced no slices — source left in place");
            return Ok(IntakeOutcome::Sliced(slices));
        }

        remove_artifact(&artifact);
        if artifact != path {
            remove_artifact(path);
        }

        Ok(IntakeOutcome::Sliced(slices))
    }
}

/// Delete a source artifact after a producing pass. Failures are logged and
/// dropped, never retried; already-written slices stay where they are.
fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!(removed = %path.display(), "Deleted source artifact"),
        Err(err) => {
            let failure = SchnittwerkError::Deletion {
                path: path.display().to_string(),
                reason: err.to_string(),
            };
            warn!(%failure, "Source artifact could not be deleted");
        }
    }
}
