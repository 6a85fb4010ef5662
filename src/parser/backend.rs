//! Page source abstraction layer.
//!
//! Heading detection and section segmentation only need positioned
//! page text. [`PageSource`] isolates them from the concrete PDF
//! library; [`LopdfBackend`] is the lopdf-backed implementation.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::{sniff_version, version_from_header};
use crate::error::{Error, Result};
use crate::model::{Document, PageLayout};

use super::layout;
use super::options::{ErrorMode, ParseOptions};

/// Positioned text of a document, page by page.
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Blocks → lines → spans of a zero-based page.
    fn page_layout(&self, page: usize) -> Result<PageLayout>;

    /// Plain text of a zero-based page.
    fn page_text(&self, page: usize) -> Result<String> {
        Ok(self.page_layout(page)?.plain_text())
    }
}

impl PageSource for Document {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_layout(&self, page: usize) -> Result<PageLayout> {
        self.pages
            .get(page)
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.pages.len()))
    }

    fn page_text(&self, page: usize) -> Result<String> {
        self.pages
            .get(page)
            .map(PageLayout::plain_text)
            .ok_or(Error::PageOutOfRange(page, self.pages.len()))
    }
}

/// Concrete [`PageSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    options: ParseOptions,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_file_with_options(path, ParseOptions::default())
    }

    /// Load from a file path with custom options.
    pub fn load_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        sniff_version(path)?;

        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc, options)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8], options: ParseOptions) -> Result<Self> {
        version_from_header(data)?;

        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc, options)
    }

    fn from_document(doc: LopdfDocument, options: ParseOptions) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc, options })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Read every page into an in-memory [`Document`].
    ///
    /// In lenient mode an unreadable page is logged and kept as an empty
    /// page so that page indices stay aligned with the PDF.
    pub fn read_document(&self) -> Result<Document> {
        let mut document = Document::new();
        document.pdf_version = self.version();

        for page in 0..self.page_count() {
            document.add_page(self.page_layout(page)?);
        }

        log::debug!(
            "Read {} pages ({} spans)",
            document.page_count(),
            document.pages.iter().map(|p| p.spans().count()).sum::<usize>()
        );
        Ok(document)
    }
}

impl PageSource for LopdfBackend {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn page_layout(&self, page: usize) -> Result<PageLayout> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .values()
            .nth(page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, pages.len()))?;

        match layout::page_layout(&self.doc, page_id, &self.options) {
            Ok(layout) => Ok(layout),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to read page {}: {}", page + 1, e);
                Ok(PageLayout::letter())
            }
            Err(e) => Err(e),
        }
    }
}
