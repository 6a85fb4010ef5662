//! Document-level types.

use super::PageLayout;
use serde::{Deserialize, Serialize};

/// The positioned text of a whole document, page by page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// PDF version (e.g., "1.7"), empty when unknown
    pub pdf_version: String,

    /// Pages in document order (index 0 is the first page)
    pub pages: Vec<PageLayout>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from page layouts.
    pub fn from_pages(pages: Vec<PageLayout>) -> Self {
        Self {
            pdf_version: String::new(),
            pages,
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by zero-based index.
    pub fn page(&self, index: usize) -> Option<&PageLayout> {
        self.pages.get(index)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageLayout) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Plain text of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages.iter().map(|p| p.plain_text()).collect()
    }
}
