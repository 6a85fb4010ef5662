//! Page-level layout types: blocks → lines → spans.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in top-down page coordinates.
///
/// `y0` is the top edge and grows downwards, so sorting by `y0`
/// ascending yields reading order from the top of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// The smallest text run sharing one font and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Font size in points
    pub size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font: String,
    /// Position on the page
    pub bbox: BBox,
}

impl Span {
    /// Create a new span.
    pub fn new(text: impl Into<String>, size: f32, font: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            size,
            font: font.into(),
            bbox,
        }
    }

    /// Whether the font name marks the span as bold.
    pub fn is_bold(&self) -> bool {
        self.font.to_lowercase().contains("bold")
    }
}

/// An ordered run of spans sharing a baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    /// Create a line from spans.
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Concatenated span text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A layout-grouped unit of one or more lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub lines: Vec<Line>,
}

impl LayoutBlock {
    /// Create a block from lines.
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Iterate all spans of the block in line order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }
}

/// The positioned text of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Blocks in reading order
    pub blocks: Vec<LayoutBlock>,
}

impl PageLayout {
    /// Create an empty page with the given dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: LayoutBlock) {
        self.blocks.push(block);
    }

    /// Builder-style variant of [`PageLayout::add_block`].
    pub fn with_block(mut self, block: LayoutBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Iterate all spans on the page.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks.iter().flat_map(|b| b.spans())
    }

    /// Plain text of the page, one line per layout line, each newline-terminated.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for line in self.blocks.iter().flat_map(|b| b.lines.iter()) {
            text.push_str(&line.text());
            text.push('\n');
        }
        text
    }

    /// Check if the page has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, size: f32, y: f32) -> Span {
        Span::new(text, size, "Helvetica", BBox::new(72.0, y, 300.0, y + size))
    }

    #[test]
    fn test_span_bold_detection() {
        let bold = Span::new("Title", 18.0, "Arial-BoldMT", BBox::default());
        let regular = Span::new("Body", 11.0, "ArialMT", BBox::default());
        assert!(bold.is_bold());
        assert!(!regular.is_bold());
    }

    #[test]
    fn test_page_plain_text() {
        let page = PageLayout::letter()
            .with_block(LayoutBlock::new(vec![
                Line::new(vec![span("Hello ", 11.0, 100.0), span("world", 11.0, 100.0)]),
                Line::new(vec![span("second line", 11.0, 114.0)]),
            ]))
            .with_block(LayoutBlock::new(vec![Line::new(vec![span(
                "next block",
                11.0,
                150.0,
            )])]));

        assert_eq!(page.plain_text(), "Hello world\nsecond line\nnext block\n");
        assert_eq!(page.spans().count(), 4);
        assert!(!page.is_empty());
    }
}
