//! Title extraction from the first page.

use crate::model::PageLayout;

/// Spans within this distance of the page maximum count as title text.
const SIZE_TOLERANCE: f32 = 0.1;

/// Extract the document title from the first page.
///
/// The title is every block carrying at least one span of the page's
/// largest font size, ordered top to bottom and joined by two spaces.
/// Within a block only the largest-size spans contribute.
pub fn extract_title(page: &PageLayout) -> String {
    let max_size = page.spans().map(|s| s.size).fold(0.0f32, f32::max);

    let mut parts: Vec<(f32, String)> = Vec::new();
    for block in &page.blocks {
        let mut text = String::new();
        let mut y = None;

        for span in block.spans() {
            if (span.size - max_size).abs() < SIZE_TOLERANCE {
                text.push_str(span.text.trim());
                text.push(' ');
                y.get_or_insert(span.bbox.y0);
            }
        }

        let text = text.trim();
        if !text.is_empty() {
            parts.push((y.unwrap_or_default(), text.to_string()));
        }
    }

    // sort_by is stable, so equal positions keep source order
    parts.sort_by(|a, b| a.0.total_cmp(&b.0));

    parts
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("  ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, LayoutBlock, Line, Span};

    fn block(spans: Vec<(&str, f32, f32)>) -> LayoutBlock {
        LayoutBlock::new(vec![Line::new(
            spans
                .into_iter()
                .map(|(text, size, y)| {
                    Span::new(text, size, "Helvetica", BBox::new(72.0, y, 300.0, y + size))
                })
                .collect(),
        )])
    }

    #[test]
    fn test_single_largest_span() {
        let page = PageLayout::letter()
            .with_block(block(vec![("Company Report", 24.0, 80.0)]))
            .with_block(block(vec![("Body text here.", 11.0, 140.0)]));

        assert_eq!(extract_title(&page), "Company Report");
    }

    #[test]
    fn test_blocks_sorted_by_position() {
        // Subtitle line appears first in the content stream but sits lower
        let page = PageLayout::letter()
            .with_block(block(vec![("Annual Review", 20.0, 150.0)]))
            .with_block(block(vec![("Body", 10.0, 60.0)]))
            .with_block(block(vec![("Overview of", 20.0, 100.0)]));

        assert_eq!(extract_title(&page), "Overview of  Annual Review");
    }

    #[test]
    fn test_only_largest_spans_within_block() {
        let page = PageLayout::letter().with_block(block(vec![
            ("RFP:", 18.0, 50.0),
            ("(draft)", 9.0, 50.0),
            (" Request ", 18.05, 50.0),
        ]));

        assert_eq!(extract_title(&page), "RFP: Request");
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(extract_title(&PageLayout::letter()), "");
    }

    #[test]
    fn test_idempotent() {
        let page = PageLayout::letter()
            .with_block(block(vec![("A Title", 16.0, 40.0)]))
            .with_block(block(vec![("Second Line", 16.0, 60.0)]));

        let first = extract_title(&page);
        assert_eq!(first, extract_title(&page));
        assert_eq!(first, "A Title  Second Line");
    }
}
