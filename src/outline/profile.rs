//! Document-wide font size statistics.

use crate::model::{HeadingLevel, TextBlock};

/// Nearest-rank font size percentiles of one document.
///
/// Built once from every merged block and read-only afterwards.
/// Invariant: `p50 <= p75 <= p90 <= p98`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontProfile {
    pub p50: f32,
    pub p75: f32,
    pub p90: f32,
    pub p98: f32,
}

impl FontProfile {
    /// Build a profile from raw font sizes; `None` when there are none.
    pub fn from_sizes(sizes: &[f32]) -> Option<Self> {
        if sizes.is_empty() {
            return None;
        }

        let mut sorted = sizes.to_vec();
        sorted.sort_by(f32::total_cmp);

        Some(Self {
            p50: percentile(&sorted, 50),
            p75: percentile(&sorted, 75),
            p90: percentile(&sorted, 90),
            p98: percentile(&sorted, 98),
        })
    }

    /// Build a profile from the font sizes of merged blocks.
    pub fn from_blocks(blocks: &[TextBlock]) -> Option<Self> {
        let sizes: Vec<f32> = blocks.iter().map(|b| b.font_size).collect();
        Self::from_sizes(&sizes)
    }

    /// Median font size; the body-text reference for relative size rules.
    pub fn median(&self) -> f32 {
        self.p50
    }

    /// Size ranges mapped to levels, checked in order.
    pub fn hierarchy(&self) -> [(f32, f32, HeadingLevel); 3] {
        [
            (self.p90, self.p98, HeadingLevel::H1),
            (self.p75, self.p90, HeadingLevel::H2),
            (self.p50, self.p75, HeadingLevel::H3),
        ]
    }

    /// First hierarchy bucket (inclusive on both ends) containing `size`.
    pub fn bucket_level(&self, size: f32) -> Option<HeadingLevel> {
        self.hierarchy()
            .into_iter()
            .find(|(lower, upper, _)| *lower <= size && size <= *upper)
            .map(|(_, _, level)| level)
    }
}

/// Nearest-rank percentile of an ascending slice, without interpolation.
///
/// Index is `floor(len * pct / 100)`, clamped to the last element.
pub fn percentile(sorted: &[f32], pct: usize) -> f32 {
    let index = (sorted.len() * pct / 100).min(sorted.len().saturating_sub(1));
    sorted[index]
}
