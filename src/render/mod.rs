//! Rendering module for the JSON outputs.

mod json;

pub use json::{outline_to_json, report_to_json, sections_to_json, to_json, JsonFormat};
