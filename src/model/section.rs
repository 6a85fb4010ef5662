//! Heading-bounded sections and their ranked form.

use super::HeadingLevel;
use serde::{Deserialize, Serialize};

/// Text attributed to one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub level: HeadingLevel,
    /// Heading text
    #[serde(rename = "text")]
    pub title: String,
    /// Zero-based start page
    #[serde(rename = "page")]
    pub start_page: usize,
    /// Exclusive end page
    #[serde(skip)]
    pub end_page: usize,
    /// Concatenated text of pages `[start_page, end_page)`, trimmed
    #[serde(rename = "section_text")]
    pub text: String,
}

/// A section placed in the global relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    /// Source document identifier (file name)
    pub document: String,
    pub title: String,
    /// One-based page number
    pub page_number: usize,
    pub text: String,
    pub similarity: f32,
    /// One-based importance rank
    pub importance_rank: usize,
}
