//! Merged text blocks used as heading candidates.

use super::LayoutBlock;

/// A layout block flattened into one candidate line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Zero-based page index
    pub page: usize,
    /// Non-empty span texts, trimmed and joined by single spaces
    pub text: String,
    /// Largest font size among the non-empty spans
    pub font_size: f32,
    /// Whether any non-empty span uses a bold font
    pub is_bold: bool,
    /// Top edge of the first non-empty span
    pub y: f32,
    /// Position of the block in document order
    pub order: usize,
}

impl TextBlock {
    /// Merge a layout block into a text block.
    ///
    /// Returns `None` when every span in the block is blank.
    pub fn merge(block: &LayoutBlock, page: usize, order: usize) -> Option<Self> {
        let mut parts: Vec<&str> = Vec::new();
        let mut font_size = 0.0f32;
        let mut is_bold = false;
        let mut y = None;

        for span in block.spans() {
            let text = span.text.trim();
            if text.is_empty() {
                continue;
            }
            parts.push(text);
            font_size = font_size.max(span.size);
            is_bold |= span.is_bold();
            y.get_or_insert(span.bbox.y0);
        }

        if parts.is_empty() {
            return None;
        }

        Some(Self {
            page,
            text: parts.join(" "),
            font_size,
            is_bold,
            y: y.unwrap_or_default(),
            order,
        })
    }
}
