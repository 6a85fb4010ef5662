//! Heading-bounded section segmentation.
//!
//! Each heading owns the pages from its own page up to (not including)
//! the page of the next later-page heading of equal or higher rank.
//! Headings sharing a page get independent, possibly overlapping text.

use crate::error::Result;
use crate::model::{Heading, HeadingLevel, Section};
use crate::parser::PageSource;

/// Exclusive end page of the section opened by `headings[index]`.
///
/// Scans later headings in outline order and stops at the first one on a
/// strictly later page whose level is equal or higher (or H1). Without a
/// match the section ends at the last page index.
pub fn section_end(headings: &[Heading], index: usize, page_count: usize) -> usize {
    let current = &headings[index];

    headings[index + 1..]
        .iter()
        .find(|next| {
            next.page > current.page
                && (next.level <= current.level || next.level == HeadingLevel::H1)
        })
        .map_or(page_count.saturating_sub(1), |next| next.page)
}

/// Split a document into one section per heading.
///
/// `headings` must be in final outline order. Page text is fetched once
/// per page no matter how many sections cover it.
pub fn segment_sections<S: PageSource + ?Sized>(
    headings: &[Heading],
    source: &S,
) -> Result<Vec<Section>> {
    if headings.is_empty() {
        log::debug!("No headings, no sections");
        return Ok(Vec::new());
    }

    let page_count = source.page_count();
    let mut page_texts: Vec<Option<String>> = vec![None; page_count];
    let mut sections = Vec::with_capacity(headings.len());

    for (index, heading) in headings.iter().enumerate() {
        let start = heading.page;
        let end = section_end(headings, index, page_count);

        let mut text = String::new();
        for page in start..end {
            match page_texts.get_mut(page) {
                Some(Some(cached)) => text.push_str(cached),
                Some(slot) => text.push_str(slot.insert(source.page_text(page)?)),
                None => text.push_str(&source.page_text(page)?),
            }
        }

        sections.push(Section {
            level: heading.level,
            title: heading.text.clone(),
            start_page: start,
            end_page: end,
            text: text.trim().to_string(),
        });
    }

    log::debug!("Segmented {} sections over {} pages", sections.len(), page_count);
    Ok(sections)
}
