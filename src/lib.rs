//! # pdfoutline
//!
//! Outline detection and persona-driven section ranking for PDF documents.
//!
//! The library reads positioned text out of a PDF, derives a title and an
//! H1–H3 heading outline from document-wide font statistics, slices the
//! document into heading-bounded sections, and ranks sections from many
//! documents by relevance to a persona and a job to be done.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{outline_to_json, parse_file, JsonFormat, OutlineOptions};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     // Read the positioned text of every page
//!     let doc = parse_file("document.pdf")?;
//!
//!     // Detect title and headings
//!     let outline = pdfoutline::extract_outline(&doc, &OutlineOptions::default())?;
//!     println!("{}", outline_to_json(&outline, JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Font statistics**: nearest-rank percentiles drive heading levels
//! - **Two heuristic profiles**: strict and relaxed heading acceptance
//! - **Section segmentation**: each heading owns pages up to the next peer
//! - **Ranking**: cosine similarity over a pluggable [`Embedder`]
//! - **Parallel batches**: rayon fan-out with per-document time budgets

pub mod detect;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod section;

// Re-export commonly used types
pub use detect::{has_pdf_extension, list_pdf_files, sniff_version};
pub use error::{Error, Result};
pub use model::{
    BBox, Document, Heading, HeadingLevel, LayoutBlock, Line, Outline, PageLayout, RankedSection,
    RankingReport, Request, Section, Span, TextBlock,
};
pub use outline::{
    extract_outline, extract_title, FontProfile, HeadingOrder, HeuristicConfig, HeuristicProfile,
    OutlineOptions,
};
pub use parser::{ErrorMode, LopdfBackend, PageSource, ParseOptions};
pub use pipeline::{
    analyze_batch, analyze_file, analyze_source, process_folder, run_ranking, DocumentAnalysis,
    FolderReport, PipelineOptions,
};
pub use rank::{
    cosine_similarity, rank_sections, DocumentSections, Embedder, HashingEmbedder, RankOptions,
    Ranking,
};
pub use render::{outline_to_json, report_to_json, sections_to_json, JsonFormat};
pub use section::segment_sections;

use std::path::Path;

/// Read a PDF file into positioned page text.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Read a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient();
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    LopdfBackend::load_file_with_options(path, options)?.read_document()
}

/// Read a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    parse_bytes_with_options(data, ParseOptions::default())
}

/// Read a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    LopdfBackend::load_bytes(data, options)?.read_document()
}

/// Extract the outline JSON of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{outline_json, JsonFormat};
///
/// let json = outline_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn outline_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    let outline = extract_outline(&doc, &OutlineOptions::default())?;
    outline_to_json(&outline, format)
}

/// Builder for analysing PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{HeadingOrder, PdfOutline};
///
/// let sections = PdfOutline::new()
///     .relaxed()
///     .with_order(HeadingOrder::PageThenPosition)
///     .lenient()
///     .parse("document.pdf")?
///     .sections()?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
pub struct PdfOutline {
    parse_options: ParseOptions,
    outline_options: OutlineOptions,
}

impl PdfOutline {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            outline_options: OutlineOptions::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Use the relaxed heading heuristics.
    pub fn relaxed(mut self) -> Self {
        self.outline_options = self.outline_options.relaxed();
        self
    }

    /// Set the heuristic profile.
    pub fn with_profile(mut self, profile: HeuristicProfile) -> Self {
        self.outline_options = self.outline_options.with_profile(profile);
        self
    }

    /// Set the heading ordering strategy.
    pub fn with_order(mut self, order: HeadingOrder) -> Self {
        self.outline_options = self.outline_options.with_order(order);
        self
    }

    /// Read a PDF file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<PdfOutlineResult> {
        let document = parse_file_with_options(path, self.parse_options)?;
        Ok(PdfOutlineResult {
            document,
            outline_options: self.outline_options,
        })
    }

    /// Read a PDF from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<PdfOutlineResult> {
        let document = parse_bytes_with_options(data, self.parse_options)?;
        Ok(PdfOutlineResult {
            document,
            outline_options: self.outline_options,
        })
    }
}

impl Default for PdfOutline {
    fn default() -> Self {
        Self::new()
    }
}

/// A read document plus the outline options to analyse it with.
pub struct PdfOutlineResult {
    /// The positioned page text
    pub document: Document,
    outline_options: OutlineOptions,
}

impl PdfOutlineResult {
    /// Title and headings.
    pub fn outline(&self) -> Result<Outline> {
        extract_outline(&self.document, &self.outline_options)
    }

    /// One section per heading.
    pub fn sections(&self) -> Result<Vec<Section>> {
        Ok(self.analyze()?.sections)
    }

    /// Outline and sections together.
    pub fn analyze(&self) -> Result<DocumentAnalysis> {
        analyze_source(&self.document, &self.outline_options)
    }

    /// Outline rendered as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        outline_to_json(&self.outline()?, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
