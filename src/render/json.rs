//! JSON rendering for outlines, section texts, and ranking reports.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Outline, RankingReport, Section};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value in the requested format.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Render `{"title": ..., "outline": [...]}`.
pub fn outline_to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    to_json(outline, format)
}

/// Render `[{"level", "text", "page", "section_text"}, ...]`.
pub fn sections_to_json(sections: &[Section], format: JsonFormat) -> Result<String> {
    to_json(sections, format)
}

/// Render the ranked report.
pub fn report_to_json(report: &RankingReport, format: JsonFormat) -> Result<String> {
    to_json(report, format)
}
