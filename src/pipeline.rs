//! Per-document pipeline and batch drivers.
//!
//! One document runs profile → classify → sanitize → segment strictly in
//! sequence. Documents share nothing, so batches fan out with rayon and
//! each document may run under its own time budget. Ranking is the only
//! cross-document step and waits for every document.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use rayon::prelude::*;

use crate::detect::list_pdf_files;
use crate::error::{Error, Result};
use crate::model::{Outline, RankingReport, Request, Section};
use crate::outline::{extract_outline, HeuristicProfile, OutlineOptions};
use crate::parser::{LopdfBackend, PageSource, ParseOptions};
use crate::rank::{rank_sections, DocumentSections, Embedder, RankOptions};
use crate::render::{outline_to_json, report_to_json, JsonFormat};
use crate::section::segment_sections;

/// Options for the whole pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// How pages are read out of each PDF
    pub parse: ParseOptions,

    /// How headings are detected and ordered
    pub outline: OutlineOptions,

    /// How sections are ranked
    pub rank: RankOptions,

    /// Wall-clock limit per document (read, outline, segment); `None` waits
    /// indefinitely. The embedding stage is bounded by `rank.deadline`.
    pub time_budget: Option<Duration>,

    /// Process batch documents on the rayon pool
    pub parallel: bool,
}

impl PipelineOptions {
    /// Create pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for the ranking run: relaxed heading heuristics.
    pub fn ranking() -> Self {
        Self::default().with_profile(HeuristicProfile::Relaxed)
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set outline options.
    pub fn with_outline_options(mut self, outline: OutlineOptions) -> Self {
        self.outline = outline;
        self
    }

    /// Set rank options.
    pub fn with_rank_options(mut self, rank: RankOptions) -> Self {
        self.rank = rank;
        self
    }

    /// Set the heuristic profile.
    pub fn with_profile(mut self, profile: HeuristicProfile) -> Self {
        self.outline.profile = profile;
        self
    }

    /// Set the number of ranked sections to keep.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.rank.top_n = top_n;
        self
    }

    /// Set the per-document time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Treat unreadable pages as empty instead of failing the document.
    pub fn lenient(mut self) -> Self {
        self.parse = self.parse.lenient();
        self
    }

    /// Process batch documents one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            outline: OutlineOptions::default(),
            rank: RankOptions::default(),
            time_budget: None,
            parallel: true,
        }
    }
}

/// Outline and sections of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    pub outline: Outline,
    pub sections: Vec<Section>,
}

/// Result for one document of a batch.
#[derive(Debug)]
pub struct BatchItem<T> {
    pub path: PathBuf,
    pub result: Result<T>,
}

/// Outcome of folder mode.
#[derive(Debug, Default)]
pub struct FolderReport {
    /// JSON files written
    pub written: Vec<PathBuf>,
    /// Input documents that failed, with the reason
    pub failed: Vec<(PathBuf, Error)>,
}

/// Outline and sections of any page source.
pub fn analyze_source<S: PageSource + ?Sized>(
    source: &S,
    options: &OutlineOptions,
) -> Result<DocumentAnalysis> {
    let outline = extract_outline(source, options)?;
    let sections = segment_sections(&outline.headings, source)?;
    Ok(DocumentAnalysis { outline, sections })
}

/// Outline and sections of a PDF file.
pub fn analyze_file<P: AsRef<Path>>(path: P, options: &PipelineOptions) -> Result<DocumentAnalysis> {
    let document =
        LopdfBackend::load_file_with_options(path.as_ref(), options.parse.clone())?.read_document()?;
    analyze_source(&document, &options.outline)
}

/// Outline of a PDF file.
pub fn outline_file<P: AsRef<Path>>(path: P, options: &PipelineOptions) -> Result<Outline> {
    let document =
        LopdfBackend::load_file_with_options(path.as_ref(), options.parse.clone())?.read_document()?;
    extract_outline(&document, &options.outline)
}

/// Run `job` on a worker thread and wait at most `budget` for it.
///
/// Without a budget the job runs on the calling thread. A job that
/// overruns is abandoned, not cancelled: its thread finishes in the
/// background and its result is dropped.
pub fn run_with_budget<T, F>(label: &str, budget: Option<Duration>, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let Some(budget) = budget else {
        return job();
    };

    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name(format!("pdfoutline-{}", label))
        .spawn(move || {
            let _ = tx.send(job());
        })?;

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("Abandoning '{}' after {:?}", label, budget);
            Err(Error::Timeout(label.to_string(), budget))
        }
        Err(RecvTimeoutError::Disconnected) => Err(Error::Other(format!(
            "worker for '{}' stopped without a result",
            label
        ))),
    }
}

fn document_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run a per-file job over many paths, merged back in input order.
fn run_batch<T, F>(
    paths: &[PathBuf],
    options: &PipelineOptions,
    job: F,
    on_item: &(dyn Fn(&BatchItem<T>) + Sync),
) -> Vec<BatchItem<T>>
where
    T: Send + 'static,
    F: Fn(&Path, &PipelineOptions) -> Result<T> + Copy + Send + Sync + 'static,
{
    let process = |path: &PathBuf| {
        let label = document_label(path);
        let owned_path = path.clone();
        let owned_options = options.clone();

        let result = run_with_budget(&label, options.time_budget, move || {
            job(&owned_path, &owned_options)
        });

        match &result {
            Ok(_) => log::info!("Processed {}", label),
            Err(e) => log::warn!("Failed to process {}: {}", label, e),
        }

        let item = BatchItem {
            path: path.clone(),
            result,
        };
        on_item(&item);
        item
    };

    if options.parallel {
        paths.par_iter().map(process).collect()
    } else {
        paths.iter().map(process).collect()
    }
}

/// Analyse many PDF files; failures never abort siblings.
pub fn analyze_batch(paths: &[PathBuf], options: &PipelineOptions) -> Vec<BatchItem<DocumentAnalysis>> {
    run_batch(
        paths,
        options,
        |path: &Path, options: &PipelineOptions| analyze_file(path, options),
        &|_| {},
    )
}

/// Extract outlines of many PDF files; failures never abort siblings.
pub fn outline_batch(paths: &[PathBuf], options: &PipelineOptions) -> Vec<BatchItem<Outline>> {
    outline_batch_with_progress(paths, options, &|_| {})
}

/// Like [`outline_batch`], calling `on_item` as each document finishes.
pub fn outline_batch_with_progress(
    paths: &[PathBuf],
    options: &PipelineOptions,
    on_item: &(dyn Fn(&BatchItem<Outline>) + Sync),
) -> Vec<BatchItem<Outline>> {
    run_batch(
        paths,
        options,
        |path: &Path, options: &PipelineOptions| outline_file(path, options),
        on_item,
    )
}

/// Output path for an input document: `<output_dir>/<stem>.json`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Folder mode: one outline JSON per PDF in `input_dir`.
pub fn process_folder<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    options: &PipelineOptions,
    format: JsonFormat,
) -> Result<FolderReport> {
    let inputs = list_pdf_files(input_dir)?;
    process_files(&inputs, output_dir.as_ref(), options, format, &|_| {})
}

/// Write one outline JSON per input into `output_dir`, creating it if missing.
pub fn process_files(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &PipelineOptions,
    format: JsonFormat,
    on_item: &(dyn Fn(&BatchItem<Outline>) + Sync),
) -> Result<FolderReport> {
    fs::create_dir_all(output_dir)?;

    let mut report = FolderReport::default();
    for item in outline_batch_with_progress(inputs, options, on_item) {
        let written = item.result.and_then(|outline| {
            let target = output_path_for(&item.path, output_dir);
            fs::write(&target, outline_to_json(&outline, format)?)?;
            Ok(target)
        });

        match written {
            Ok(target) => report.written.push(target),
            Err(e) => report.failed.push((item.path, e)),
        }
    }

    log::info!(
        "Wrote {} outlines, {} failed",
        report.written.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Local time in ISO-8601 with microseconds.
pub fn processing_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Ranking run: rank the sections of every requested document.
///
/// Documents are looked up as `<pdfs_dir>/<filename>`. A document that
/// fails or overruns its budget is skipped with a warning. Embedding
/// retries stop at `options.rank.deadline`, degrading to encounter order.
pub fn run_ranking<E: Embedder + ?Sized>(
    request: &Request,
    pdfs_dir: &Path,
    options: &PipelineOptions,
    embedder: &mut E,
) -> Result<RankingReport> {
    let paths: Vec<PathBuf> = request
        .documents
        .iter()
        .map(|d| pdfs_dir.join(&d.filename))
        .collect();

    let documents: Vec<DocumentSections> = analyze_batch(&paths, options)
        .into_iter()
        .zip(&request.documents)
        .filter_map(|(item, doc)| match item.result {
            Ok(analysis) => Some(DocumentSections::new(&doc.filename, analysis.sections)),
            Err(e) => {
                log::warn!("Skipping {}: {}", doc.filename, e);
                None
            }
        })
        .collect();

    let query = request.query();
    let ranking = rank_sections(&query, &documents, embedder, &options.rank);
    if ranking.degraded {
        log::warn!("Ranking degraded to encounter order");
    }

    Ok(RankingReport::new(
        request,
        &ranking.sections,
        processing_timestamp(),
    ))
}

/// Ranking run from files; the output is written only after ranking succeeds.
pub fn run_ranking_file<E: Embedder + ?Sized>(
    request_path: &Path,
    pdfs_dir: &Path,
    output_path: &Path,
    options: &PipelineOptions,
    embedder: &mut E,
    format: JsonFormat,
) -> Result<RankingReport> {
    let request = Request::from_json(&fs::read_to_string(request_path)?)?;
    let report = run_ranking(&request, pdfs_dir, options, embedder)?;

    let json = report_to_json(&report, format)?;
    fs::write(output_path, json)?;
    Ok(report)
}
