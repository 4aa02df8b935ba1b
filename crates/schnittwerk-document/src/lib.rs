// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// schnittwerk-document — Document processing for the Schnittwerk slicer.
//
// Provides PDF operations (open, per-page text, standalone page and range
// export), PDF generation from plain text (used by the DOCX converter), and
// OOXML character counting for DOCX and PPTX inputs.

pub mod convert;
pub mod office;
pub mod pdf;

// Re-export the primary structs so callers can use `schnittwerk_document::PdfReader` etc.
pub use convert::DocumentConverter;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
