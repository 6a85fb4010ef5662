//! Document model types.
//!
//! Positioned page text (blocks → lines → spans) produced by a page
//! source, the merged blocks fed to heading detection, and the typed
//! outputs of the pipeline: outlines, sections, and ranked reports.

mod block;
mod document;
mod outline;
mod page;
mod request;
mod section;

pub use block::TextBlock;
pub use document::Document;
pub use outline::{Heading, HeadingLevel, Outline};
pub use page::{BBox, LayoutBlock, Line, PageLayout, Span};
pub use request::{
    DocumentRef, ExtractedSection, JobToBeDone, Persona, RankingReport, ReportMetadata, Request,
    SubsectionAnalysis,
};
pub use section::{RankedSection, Section};
