//! Outline types: heading levels, headings, and the document outline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level.
///
/// Ordering follows precedence: `H1 < H2 < H3`, where a smaller
/// level is a higher-ranking heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// All levels, highest precedence first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level for a numeric depth, if it is in range.
    pub fn from_depth(depth: u8) -> Option<Self> {
        match depth {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A detected heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    /// Zero-based page index
    pub page: usize,
}

impl Heading {
    /// Create a new heading.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: usize) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Document title plus ordered headings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    #[serde(rename = "outline")]
    pub headings: Vec<Heading>,
}

impl Outline {
    /// Create an outline.
    pub fn new(title: impl Into<String>, headings: Vec<Heading>) -> Self {
        Self {
            title: title.into(),
            headings,
        }
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}
