//! Title and heading detection.
//!
//! Works in three strictly ordered steps over one document:
//!
//! 1. every layout block is merged into a [`TextBlock`] and the
//!    document-wide [`FontProfile`] is built from their sizes
//! 2. each block is classified against the profile with its neighbours
//!    as context
//! 3. accepted headings are deduplicated, ordered, and cleaned up

mod heuristics;
mod profile;
mod sanitize;
mod title;

pub use heuristics::{
    classify_level, is_rejected, BlockContext, HeuristicConfig, HeuristicProfile, Padding, Rule,
};
pub use profile::{percentile, FontProfile};
pub use sanitize::{is_numeric_fragment, sanitize, Candidate, HeadingOrder};
pub use title::extract_title;

use crate::error::Result;
use crate::model::{Heading, Outline, TextBlock};
use crate::parser::PageSource;

/// Options for outline extraction.
#[derive(Debug, Clone, Default)]
pub struct OutlineOptions {
    /// Which heuristic rule set accepts headings
    pub profile: HeuristicProfile,

    /// How accepted headings are ordered
    pub order: HeadingOrder,
}

impl OutlineOptions {
    /// Create outline options with defaults (strict, page-then-text).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heuristic profile.
    pub fn with_profile(mut self, profile: HeuristicProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Use the relaxed heuristic profile.
    pub fn relaxed(mut self) -> Self {
        self.profile = HeuristicProfile::Relaxed;
        self
    }

    /// Set the heading ordering strategy.
    pub fn with_order(mut self, order: HeadingOrder) -> Self {
        self.order = order;
        self
    }
}

/// Merge every layout block of the document, in page then block order.
pub fn collect_blocks<S: PageSource + ?Sized>(source: &S) -> Result<Vec<TextBlock>> {
    let mut blocks = Vec::new();
    for page in 0..source.page_count() {
        let layout = source.page_layout(page)?;
        for block in &layout.blocks {
            if let Some(merged) = TextBlock::merge(block, page, blocks.len()) {
                blocks.push(merged);
            }
        }
    }
    Ok(blocks)
}

/// Detect headings among merged blocks.
///
/// Returns an empty list when the blocks carry no font sizes at all.
pub fn extract_headings(blocks: &[TextBlock], options: &OutlineOptions) -> Vec<Heading> {
    let Some(profile) = FontProfile::from_blocks(blocks) else {
        log::debug!("No text blocks, outline is empty");
        return Vec::new();
    };

    log::debug!(
        "Font profile over {} blocks: p50={} p75={} p90={} p98={}",
        blocks.len(),
        profile.p50,
        profile.p75,
        profile.p90,
        profile.p98
    );

    let config = options.profile.config();
    let mut candidates = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        let context = BlockContext {
            text: &block.text,
            font_size: block.font_size,
            is_bold: block.is_bold,
            prev_text: i.checked_sub(1).map_or("", |p| blocks[p].text.as_str()),
            next_text: blocks.get(i + 1).map_or("", |n| n.text.as_str()),
        };

        if !config.is_heading(&context, &profile) {
            continue;
        }

        let text = block.text.trim();
        candidates.push(Candidate {
            heading: Heading::new(
                classify_level(text, block.font_size, &profile),
                text,
                block.page,
            ),
            y: block.y,
            order: block.order,
        });
    }

    let headings = sanitize(candidates, options.order);
    log::debug!("Detected {} headings ({} profile)", headings.len(), options.profile);
    headings
}

/// Extract the title and heading outline of a document.
pub fn extract_outline<S: PageSource + ?Sized>(
    source: &S,
    options: &OutlineOptions,
) -> Result<Outline> {
    let title = if source.page_count() > 0 {
        extract_title(&source.page_layout(0)?)
    } else {
        String::new()
    };

    let blocks = collect_blocks(source)?;
    let headings = extract_headings(&blocks, options);

    Ok(Outline::new(title, headings))
}
