//! Integration tests for section ranking.

use std::collections::HashMap;

use pdfoutline::{
    rank_sections, DocumentSections, Embedder, HashingEmbedder, HeadingLevel, RankOptions,
    Section,
};

/// Embeds every section at a fixed cosine to the query direction `[1, 0]`.
struct FixedEmbedder {
    similarities: HashMap<String, f32>,
}

impl FixedEmbedder {
    fn new(pairs: &[(&str, f32)]) -> Self {
        Self {
            similarities: pairs.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
        }
    }
}

impl Embedder for FixedEmbedder {
    fn embed_document(&mut self, text: &str) -> pdfoutline::Result<Vec<f32>> {
        let s = self.similarities.get(text).copied().unwrap_or(0.0);
        Ok(vec![s, (1.0 - s * s).sqrt()])
    }

    fn embed_query(&mut self, _text: &str) -> pdfoutline::Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        2
    }
}

fn section(title: &str, page: usize, text: &str) -> Section {
    Section {
        level: HeadingLevel::H1,
        title: title.to_string(),
        start_page: page,
        end_page: page + 1,
        text: text.to_string(),
    }
}

fn five_candidates() -> (Vec<DocumentSections>, FixedEmbedder) {
    let documents = vec![
        DocumentSections::new(
            "first.pdf",
            vec![
                section("Alpha", 0, "alpha text"),
                section("Beta", 1, "beta text"),
                section("Gamma", 2, "gamma text"),
            ],
        ),
        DocumentSections::new(
            "second.pdf",
            vec![
                section("Delta", 0, "delta text"),
                section("Epsilon", 4, "epsilon text"),
            ],
        ),
    ];
    let embedder = FixedEmbedder::new(&[
        ("alpha text", 0.9),
        ("beta text", 0.2),
        ("gamma text", 0.75),
        ("delta text", 0.75),
        ("epsilon text", 0.4),
    ]);
    (documents, embedder)
}

#[test]
fn test_ties_keep_encounter_order() {
    let (documents, mut embedder) = five_candidates();
    let options = RankOptions::new().with_top_n(3);

    let ranking = rank_sections("query", &documents, &mut embedder, &options);
    assert!(!ranking.degraded);

    let titles: Vec<&str> = ranking.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Alpha", "Gamma", "Delta"]);

    let ranks: Vec<usize> = ranking.sections.iter().map(|s| s.importance_rank).collect();
    assert_eq!(ranks, [1, 2, 3]);

    assert!((ranking.sections[0].similarity - 0.9).abs() < 1e-4);
    assert_eq!(ranking.sections[1].similarity, ranking.sections[2].similarity);
    assert_eq!(ranking.sections[1].document, "first.pdf");
    assert_eq!(ranking.sections[2].document, "second.pdf");
}

/// Returns a NaN vector for one text and fixed directions for the rest.
struct NanEmbedder;

impl Embedder for NanEmbedder {
    fn embed_document(&mut self, text: &str) -> pdfoutline::Result<Vec<f32>> {
        Ok(match text {
            "broken text" => vec![f32::NAN, 0.0],
            "good text" => vec![1.0, 0.0],
            _ => vec![0.0, 1.0],
        })
    }

    fn embed_query(&mut self, _text: &str) -> pdfoutline::Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        2
    }
}

#[test]
fn test_non_finite_vectors_never_outrank_real_matches() {
    let documents = vec![DocumentSections::new(
        "mixed.pdf",
        vec![
            section("Broken", 0, "broken text"),
            section("Good", 1, "good text"),
            section("Other", 2, "other text"),
        ],
    )];

    let ranking = rank_sections("query", &documents, &mut NanEmbedder, &RankOptions::new());
    assert!(!ranking.degraded);

    let titles: Vec<&str> = ranking.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Good", "Broken", "Other"]);
    assert!(ranking.sections.iter().all(|s| s.similarity.is_finite()));
    for pair in ranking.sections.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[test]
fn test_page_number_is_one_based() {
    let (documents, mut embedder) = five_candidates();
    let ranking = rank_sections("query", &documents, &mut embedder, &RankOptions::new());

    let epsilon = ranking
        .sections
        .iter()
        .find(|s| s.title == "Epsilon")
        .unwrap();
    assert_eq!(epsilon.page_number, 5);
    assert_eq!(epsilon.text, "epsilon text");
}

#[test]
fn test_top_n_larger_than_pool() {
    let (documents, mut embedder) = five_candidates();
    let options = RankOptions::new().with_top_n(50);

    let ranking = rank_sections("query", &documents, &mut embedder, &options);
    assert_eq!(ranking.sections.len(), 5);
    assert_eq!(ranking.sections.last().unwrap().title, "Beta");
}

#[test]
fn test_similarities_non_increasing() {
    let (documents, mut embedder) = five_candidates();
    let ranking = rank_sections("query", &documents, &mut embedder, &RankOptions::new());

    assert_eq!(ranking.sections.len(), 5);
    for pair in ranking.sections.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
        assert_eq!(pair[0].importance_rank + 1, pair[1].importance_rank);
    }
}

#[test]
fn test_empty_pool() {
    let mut embedder = HashingEmbedder::default();
    let documents = vec![DocumentSections::new("empty.pdf", Vec::new())];

    let ranking = rank_sections("anything", &documents, &mut embedder, &RankOptions::new());
    assert!(ranking.sections.is_empty());
    assert!(!ranking.degraded);
}

#[test]
fn test_hashing_embedder_prefers_overlapping_text() {
    let documents = vec![DocumentSections::new(
        "guide.pdf",
        vec![
            section("Nightlife", 0, "bars and clubs open late near the harbour"),
            section("Cuisine", 1, "seafood restaurants serve local dishes and wine"),
            section("History", 2, "the old town walls date from the twelfth century"),
        ],
    )];
    let mut embedder = HashingEmbedder::default();
    let options = RankOptions::new().with_top_n(1);

    let ranking = rank_sections(
        "Food critic. Find restaurants with local seafood dishes",
        &documents,
        &mut embedder,
        &options,
    );
    assert_eq!(ranking.sections[0].title, "Cuisine");
    assert!(ranking.sections[0].similarity > 0.0);
}
