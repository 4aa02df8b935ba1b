// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page cost measurement.

use schnittwerk_core::PageCost;
use schnittwerk_core::error::{Result, SchnittwerkError};
use schnittwerk_document::PdfReader;
use tracing::debug;

/// Source of per-page costs for the packing engine.
///
/// The packer only ever talks to this trait, so packing decisions are
/// testable without any document I/O behind them.
pub trait PageMeasurer {
    /// Total pages available, 1-indexed from 1 to this value.
    fn page_count(&self) -> u32;

    /// Measure one page: extracted character count plus the byte size of a
    /// standalone single-page artifact. Must be deterministic per page.
    fn measure(&self, page_number: u32) -> Result<PageCost>;
}

/// Measures pages of an opened PDF.
///
/// The byte cost is obtained by actually serialising a one-page document —
/// container overhead is non-additive, so no share of the whole-file size
/// would be correct.
pub struct PdfPageMeasurer<'a> {
    reader: &'a PdfReader,
}

impl<'a> PdfPageMeasurer<'a> {
    pub fn new(reader: &'a PdfReader) -> Self {
        Self { reader }
    }
}

impl PageMeasurer for PdfPageMeasurer<'_> {
    fn page_count(&self) -> u32 {
        self.reader.page_count()
    }

    fn measure(&self, page_number: u32) -> Result<PageCost> {
        let text = self
            .reader
            .page_text(page_number)
            .map_err(|err| SchnittwerkError::UnmeasurablePage {
                page: page_number,
                reason: err.to_string(),
            })?;
        let standalone = self
            .reader
            .extract_page(page_number)
            .map_err(|err| SchnittwerkError::UnmeasurablePage {
                page: page_number,
                reason: err.to_string(),
            })?;

        let cost = PageCost {
            chars: text.chars().count(),
            bytes: standalone.len() as u64,
        };
        debug!(
            page = page_number,
            chars = cost.chars,
            bytes = cost.bytes,
            "Page measured"
        );
        Ok(cost)
    }
}
