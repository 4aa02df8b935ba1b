// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open existing PDF documents, extract per-page text, and export
// single pages or contiguous page ranges as standalone PDFs using `lopdf`.
//
// Range export is the slicer's output primitive; single-page export doubles
// as the byte-size measurement primitive (a page's cost is the size of a
// one-page artifact, never a pro-rated share of the whole file).

use std::path::Path;

use lopdf::{Document, Object, ObjectId, dictionary};
use schnittwerk_core::SliceRange;
use schnittwerk_core::error::SchnittwerkError;
use tracing::{debug, info, instrument, warn};

/// Page attributes that may live on an ancestor /Pages node and be inherited.
/// An exported page must carry them itself or the slice will not render
/// standalone.
const INHERITABLE_PAGE_KEYS: [&[u8]; 3] = [b"Resources", b"MediaBox", b"Rotate"];

/// Reads existing PDF files and exports pages from them.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SchnittwerkError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            SchnittwerkError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SchnittwerkError> {
        let document = Document::load_mem(data).map_err(|err| {
            SchnittwerkError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    // -- Text -----------------------------------------------------------------

    /// Extract the text of a single page (1-indexed).
    pub fn page_text(&self, page_number: u32) -> Result<String, SchnittwerkError> {
        let total = self.page_count();
        if page_number == 0 || page_number > total {
            return Err(SchnittwerkError::Pdf(format!(
                "page {} out of range (document has {} pages)",
                page_number, total
            )));
        }

        self.document.extract_text(&[page_number]).map_err(|err| {
            SchnittwerkError::Pdf(format!(
                "text extraction failed for page {}: {}",
                page_number, err
            ))
        })
    }

    /// Total extracted character count across all pages, counted in Unicode
    /// scalar values.
    #[instrument(skip(self), fields(pages = self.page_count()))]
    pub fn total_char_count(&self) -> Result<usize, SchnittwerkError> {
        let mut total = 0usize;
        for page_number in 1..=self.page_count() {
            total += self.page_text(page_number)?.chars().count();
        }
        debug!(chars = total, "Character count complete");
        Ok(total)
    }

    // -- Export ---------------------------------------------------------------

    /// Export a single page (1-indexed) as a standalone one-page PDF.
    ///
    /// The returned byte length is the page's measured byte cost.
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>, SchnittwerkError> {
        self.extract_range(SliceRange::single(page_number))
    }

    /// Export a contiguous page range as a new standalone PDF, returned as
    /// serialised bytes. Page order is preserved.
    #[instrument(skip(self), fields(range = %range))]
    pub fn extract_range(&self, range: SliceRange) -> Result<Vec<u8>, SchnittwerkError> {
        let pages = self.document.get_pages();
        let total = pages.len() as u32;
        if range.start == 0 || range.end > total {
            return Err(SchnittwerkError::Pdf(format!(
                "range {} out of bounds (document has {} pages)",
                range, total
            )));
        }

        let (mut target, pages_root) = new_slice_shell();

        for page_number in range.start..=range.end {
            // lopdf pages are keyed by 1-indexed page number.
            let page_id: ObjectId = *pages.get(&page_number).ok_or_else(|| {
                SchnittwerkError::Pdf(format!("page {} not found in page tree", page_number))
            })?;
            self.append_page(&mut target, pages_root, page_id)?;
        }

        let mut output = Vec::new();
        target.save_to(&mut output).map_err(|err| {
            SchnittwerkError::Pdf(format!("failed to serialise page range {}: {}", range, err))
        })?;

        debug!(output_bytes = output.len(), "Range exported");
        Ok(output)
    }

    // -- Helpers --------------------------------------------------------------

    /// Clone one page of this document (and everything it transitively
    /// references) into `target`, appending it as the last page under
    /// `pages_root`.
    fn append_page(
        &self,
        target: &mut Document,
        pages_root: ObjectId,
        page_id: ObjectId,
    ) -> Result<(), SchnittwerkError> {
        let page_object = self.document.get_object(page_id).map_err(|err| {
            SchnittwerkError::Pdf(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let cloned = clone_object_graph(&self.document, target, page_object)?;
        let cloned_id = target.add_object(cloned);

        // Materialise attributes the source page inherits from its ancestors.
        for key in INHERITABLE_PAGE_KEYS {
            let already_present = match target.get_object(cloned_id) {
                Ok(Object::Dictionary(dict)) => dict.has(key),
                _ => true,
            };
            if already_present {
                continue;
            }
            if let Some(value) = inherited_page_attribute(&self.document, page_id, key) {
                let cloned_value = clone_object_graph(&self.document, target, value)?;
                if let Ok(Object::Dictionary(dict)) = target.get_object_mut(cloned_id) {
                    dict.set(key, cloned_value);
                }
            }
        }

        // Register the page under the target's /Pages node.
        if let Ok(Object::Dictionary(pages_dict)) = target.get_object_mut(pages_root) {
            if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
                kids.push(Object::Reference(cloned_id));
            }
            if let Ok(count_obj) = pages_dict.get_mut(b"Count")
                && let Object::Integer(count) = count_obj
            {
                *count += 1;
            }
        }

        // Point the cloned page's /Parent at the target's /Pages node.
        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(cloned_id) {
            page_dict.set("Parent", Object::Reference(pages_root));
        }

        Ok(())
    }
}

/// Create an empty PDF document with a /Catalog and an empty /Pages node,
/// returning it together with the /Pages object ID.
fn new_slice_shell() -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Object::Array(Vec::new()),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    (doc, pages_id)
}

/// Look up a page attribute on the page's ancestor /Pages nodes, walking the
/// /Parent chain upward. Returns the nearest ancestor's value.
fn inherited_page_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = parent_node(doc, page_id)?;
    loop {
        let dict = match doc.get_object(current) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return None,
        };
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
    }
}

/// The /Parent reference of a dictionary object, if any.
fn parent_node(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    match doc.get_object(id) {
        Ok(Object::Dictionary(dict)) => match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => Some(*parent),
            _ => None,
        },
        _ => None,
    }
}

/// Deep-clone a single lopdf object from `source` into `target`, recursively
/// resolving references. /Parent entries are deliberately skipped — they form
/// cycles and are re-established by the caller.
fn clone_object_graph(
    source: &Document,
    target: &mut Document,
    object: &Object,
) -> Result<Object, SchnittwerkError> {
    match object {
        Object::Dictionary(dict) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                let cloned_value = clone_object_graph(source, target, value)?;
                new_dict.set(key.clone(), cloned_value);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(items) => {
            let mut new_items = Vec::with_capacity(items.len());
            for item in items {
                new_items.push(clone_object_graph(source, target, item)?);
            }
            Ok(Object::Array(new_items))
        }
        Object::Reference(ref_id) => match source.get_object(*ref_id) {
            Ok(referenced) => {
                let cloned = clone_object_graph(source, target, referenced)?;
                let new_id = target.add_object(cloned);
                Ok(Object::Reference(new_id))
            }
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                Ok(Object::Null)
            }
        },
        Object::Stream(stream) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in stream.dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                let cloned_value = clone_object_graph(source, target, value)?;
                new_dict.set(key.clone(), cloned_value);
            }
            Ok(Object::Stream(lopdf::Stream::new(
                new_dict,
                stream.content.clone(),
            )))
        }
        // Boolean, Integer, Real, String, Name, Null are trivially cloneable.
        other => Ok(other.clone()),
    }
}
