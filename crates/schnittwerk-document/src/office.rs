// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OOXML text measurement — character counting for DOCX and PPTX inputs, and
// paragraph-text extraction for the DOCX converter.
//
// Both formats are ZIP archives of XML parts. Text lives in `w:t` runs
// (word/document.xml) for DOCX and `a:t` runs (ppt/slides/slide*.xml) for
// PPTX; everything else in the markup is ignored.

use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use schnittwerk_core::DocumentKind;
use schnittwerk_core::error::{Result, SchnittwerkError};
use tracing::{debug, info, instrument};

use crate::pdf::reader::PdfReader;

/// Count the extracted characters of a document, format-appropriately.
///
/// Counts are Unicode scalar counts of the text runs only — markup, layout,
/// and inter-run whitespace do not contribute.
#[instrument(skip_all, fields(path = %path.display(), ?kind))]
pub fn count_chars(path: &Path, kind: DocumentKind) -> Result<usize> {
    info!("Counting characters");
    let count = match kind {
        DocumentKind::Docx => text_run_chars(&read_archive_part(path, "word/document.xml")?, b"w:t")?,
        DocumentKind::Pptx => count_pptx_chars(path)?,
        DocumentKind::Pdf => PdfReader::open(path)?.total_char_count()?,
    };
    info!(chars = count, "Character count complete");
    Ok(count)
}

/// Extract the paragraph text of a DOCX file, one line per paragraph.
///
/// This feeds the DOCX → PDF converter; pagination is re-flowed downstream,
/// so only paragraph boundaries need to survive.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_docx_text(path: &Path) -> Result<String> {
    let xml = read_archive_part(path, "word/document.xml")?;

    let mut reader = Reader::from_str(&xml);
    let mut output = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_text_run = false,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => output.push('\n'),
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|err| {
                    SchnittwerkError::UnreadableSource(format!("malformed DOCX text run: {err}"))
                })?;
                output.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SchnittwerkError::UnreadableSource(format!(
                    "DOCX XML parse error: {err}"
                )));
            }
            _ => {}
        }
    }

    debug!(chars = output.len(), "DOCX text extracted");
    Ok(output)
}

/// Sum the text-run characters across every slide of a PPTX file.
fn count_pptx_chars(path: &Path) -> Result<usize> {
    let file = std::fs::File::open(path).map_err(|err| {
        SchnittwerkError::UnreadableSource(format!("failed to open {}: {}", path.display(), err))
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| {
        SchnittwerkError::UnreadableSource(format!("not a PPTX archive: {err}"))
    })?;

    // Slide parts are ppt/slides/slideN.xml; relationship parts under
    // ppt/slides/_rels/ must not be counted.
    let slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
        })
        .map(str::to_owned)
        .collect();

    let mut total = 0usize;
    for name in &slide_names {
        let mut xml = String::new();
        archive
            .by_name(name)
            .map_err(|err| {
                SchnittwerkError::UnreadableSource(format!("missing slide part {name}: {err}"))
            })?
            .read_to_string(&mut xml)
            .map_err(|err| {
                SchnittwerkError::UnreadableSource(format!("unreadable slide part {name}: {err}"))
            })?;
        total += text_run_chars(&xml, b"a:t")?;
    }

    debug!(slides = slide_names.len(), chars = total, "PPTX slides counted");
    Ok(total)
}

/// Read one named part out of an OOXML ZIP archive as a string.
fn read_archive_part(path: &Path, part: &str) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|err| {
        SchnittwerkError::UnreadableSource(format!("failed to open {}: {}", path.display(), err))
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| {
        SchnittwerkError::UnreadableSource(format!("not an OOXML archive: {err}"))
    })?;

    let mut contents = String::new();
    archive
        .by_name(part)
        .map_err(|err| SchnittwerkError::UnreadableSource(format!("missing {part}: {err}")))?
        .read_to_string(&mut contents)
        .map_err(|err| SchnittwerkError::UnreadableSource(format!("unreadable {part}: {err}")))?;

    Ok(contents)
}

/// Count the Unicode scalar values inside every `<tag>` text run of an XML
/// part.
fn text_run_chars(xml: &str, tag: &[u8]) -> Result<usize> {
    let mut reader = Reader::from_str(xml);
    let mut count = 0usize;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == tag => in_text_run = true,
            Ok(Event::End(e)) if e.name().as_ref() == tag => in_text_run = false,
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|err| {
                    SchnittwerkError::UnreadableSource(format!("malformed text run: {err}"))
                })?;
                count += text.chars().count();
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SchnittwerkError::UnreadableSource(format!(
                    "XML parse error: {err}"
                )));
            }
            _ => {}
        }
    }

    Ok(count)
}
