// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document conversion to the page-addressable format (PDF).
//
// DOCX is converted by extracting its paragraph text and re-laying it out
// with the PDF writer — pagination is re-flowed, not preserved. PPTX
// conversion is not implemented and reports a failure.

use std::path::{Path, PathBuf};

use schnittwerk_core::DocumentKind;
use schnittwerk_core::error::{Result, SchnittwerkError};
use tracing::{debug, error, info, instrument};

use crate::office;
use crate::pdf::writer::PdfWriter;

/// Converts office documents into PDFs the slicer can operate on.
pub struct DocumentConverter;

impl DocumentConverter {
    /// Produce a page-addressable artifact for `path`.
    ///
    /// Returns the path of the PDF written beside the source (`<stem>.pdf`).
    /// A PDF input passes through unchanged.
    #[instrument(skip_all, fields(path = %path.display(), ?kind))]
    pub fn to_pdf(path: &Path, kind: DocumentKind) -> Result<PathBuf> {
        match kind {
            DocumentKind::Pdf => {
                debug!("source is already page-addressable — no conversion needed");
                Ok(path.to_path_buf())
            }
            DocumentKind::Docx => {
                info!("Converting DOCX to PDF");
                let text = office::extract_docx_text(path)
                    .map_err(|err| SchnittwerkError::Conversion(err.to_string()))?;

                let pdf_path = path.with_extension("pdf");
                let mut writer = PdfWriter::new();
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    writer.set_title(stem);
                }
                writer
                    .write_text_to_file(&text, &pdf_path)
                    .map_err(|err| SchnittwerkError::Conversion(err.to_string()))?;

                info!(pdf = %pdf_path.display(), "Conversion complete");
                Ok(pdf_path)
            }
            DocumentKind::Pptx => {
                error!("PPTX conversion not yet implemented");
                Err(SchnittwerkError::Conversion(
                    "PPTX to PDF conversion not yet available".into(),
                ))
            }
        }
    }
}
