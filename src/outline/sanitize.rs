//! Outline cleanup: deduplication, ordering, and fragment removal.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Heading;

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.$").unwrap());
static NUMBER_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*$").unwrap());

/// How accepted headings are ordered within the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingOrder {
    /// Page, then heading text (byte-wise)
    #[default]
    PageThenText,
    /// Page, then vertical position on the page
    PageThenPosition,
}

impl fmt::Display for HeadingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingOrder::PageThenText => write!(f, "text"),
            HeadingOrder::PageThenPosition => write!(f, "position"),
        }
    }
}

impl FromStr for HeadingOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "page-then-text" => Ok(HeadingOrder::PageThenText),
            "position" | "page-then-position" => Ok(HeadingOrder::PageThenPosition),
            other => Err(format!("unknown heading order '{}'", other)),
        }
    }
}

/// An accepted heading with the layout position it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub heading: Heading,
    /// Top edge on the page
    pub y: f32,
    /// Block position in document order
    pub order: usize,
}

/// Turn accepted candidates (in document order) into the final heading list.
pub fn sanitize(candidates: Vec<Candidate>, order: HeadingOrder) -> Vec<Heading> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.heading.text.clone()))
        .collect();

    match order {
        HeadingOrder::PageThenText => kept.sort_by(|a, b| {
            a.heading
                .page
                .cmp(&b.heading.page)
                .then_with(|| a.heading.text.cmp(&b.heading.text))
        }),
        HeadingOrder::PageThenPosition => kept.sort_by(|a, b| {
            a.heading
                .page
                .cmp(&b.heading.page)
                .then_with(|| a.y.total_cmp(&b.y))
                .then_with(|| a.order.cmp(&b.order))
        }),
    }

    kept.into_iter()
        .map(|c| c.heading)
        .filter(|h| !is_numeric_fragment(&h.text))
        .collect()
}

/// Whether a heading is only a section number such as `3.`.
pub fn is_numeric_fragment(text: &str) -> bool {
    BARE_NUMBER.is_match(text) || (NUMBER_ONLY.is_match(text) && text.chars().count() < 5)
}
