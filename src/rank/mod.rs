//! Persona-driven relevance ranking of sections.
//!
//! Every section of every document is scored against one query in a
//! single pool, so ranking only starts once all documents are segmented.

mod embed;

use std::time::{Duration, Instant};

pub use embed::{
    cosine_similarity, l2_normalize, tokenize, Embedder, HashingEmbedder, DEFAULT_DIMENSION,
};

use crate::error::{Error, Result};
use crate::model::{RankedSection, Section};

/// Options for section ranking.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Number of sections to keep
    pub top_n: usize,

    /// Extra embedding attempts after a failure
    pub max_retries: usize,

    /// Wall-clock limit for the embedding stage; no retry starts past it.
    ///
    /// A single blocking embedder call is not interrupted.
    pub deadline: Option<Duration>,
}

impl RankOptions {
    /// Create rank options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of sections to keep.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the number of extra embedding attempts.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the embedding-stage deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            max_retries: 2,
            deadline: None,
        }
    }
}

/// Sections of one document, tagged with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSections {
    /// Document identifier (file name)
    pub document: String,
    pub sections: Vec<Section>,
}

impl DocumentSections {
    /// Create a tagged section list.
    pub fn new(document: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            document: document.into(),
            sections,
        }
    }
}

/// Outcome of a ranking run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// Ranked sections, best first
    pub sections: Vec<RankedSection>,
    /// Set when embedding failed and sections kept encounter order
    pub degraded: bool,
}

/// Rank every section of every document against `query`.
///
/// Sections are sorted by descending cosine similarity; ties keep their
/// encounter order (documents in input order, sections in outline order).
/// When the embedder keeps failing after `max_retries` extra attempts,
/// or fails once `deadline` has passed, the first `top_n` sections are
/// returned in encounter order with a similarity of 0.0 and
/// [`Ranking::degraded`] set.
pub fn rank_sections<E: Embedder + ?Sized>(
    query: &str,
    documents: &[DocumentSections],
    embedder: &mut E,
    options: &RankOptions,
) -> Ranking {
    let candidates: Vec<(&str, &Section)> = documents
        .iter()
        .flat_map(|d| d.sections.iter().map(move |s| (d.document.as_str(), s)))
        .collect();

    if candidates.is_empty() {
        log::warn!("No sections found for similarity computation");
        return Ranking::default();
    }

    let texts: Vec<&str> = candidates.iter().map(|(_, s)| s.text.as_str()).collect();

    let (scores, degraded) = match score_with_retry(query, &texts, embedder, options)
    {
        Ok(scores) => (scores, false),
        Err(e) => {
            log::warn!("Embedding unavailable, keeping encounter order: {}", e);
            (vec![0.0; candidates.len()], true)
        }
    };

    let mut scored: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    if !degraded {
        // stable: equal scores keep encounter order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    }

    let sections = scored
        .into_iter()
        .take(options.top_n)
        .enumerate()
        .map(|(rank, (index, similarity))| {
            let (document, section) = candidates[index];
            RankedSection {
                document: document.to_string(),
                title: section.title.clone(),
                page_number: section.start_page + 1,
                text: section.text.clone(),
                similarity,
                importance_rank: rank + 1,
            }
        })
        .collect();

    Ranking { sections, degraded }
}

/// Similarity of each text to the query, retrying failed embedding calls.
fn score_with_retry<E: Embedder + ?Sized>(
    query: &str,
    texts: &[&str],
    embedder: &mut E,
    options: &RankOptions,
) -> Result<Vec<f32>> {
    let started = Instant::now();
    let mut attempt = 0;
    loop {
        match score(query, texts, embedder) {
            Ok(scores) => return Ok(scores),
            Err(e) if options.deadline.is_some_and(|d| started.elapsed() >= d) => {
                log::warn!("Embedding deadline passed after {} attempts", attempt + 1);
                return Err(e);
            }
            Err(e) if attempt < options.max_retries => {
                attempt += 1;
                log::warn!("Embedding attempt {} failed, retrying: {}", attempt, e);
            }
            Err(e) => return Err(e),
        }
    }
}

fn score<E: Embedder + ?Sized>(query: &str, texts: &[&str], embedder: &mut E) -> Result<Vec<f32>> {
    let query_vector = embedder.embed_query(query)?;
    let vectors = embedder.embed_batch(texts)?;

    if vectors.len() != texts.len() {
        return Err(Error::Embedding(format!(
            "expected {} vectors, got {}",
            texts.len(),
            vectors.len()
        )));
    }

    Ok(vectors
        .iter()
        .map(|v| cosine_similarity(&query_vector, v))
        .collect())
}
