//! Ranking request descriptor and ranked report types.

use serde::{Deserialize, Serialize};

use super::RankedSection;
use crate::error::Result;

/// Requested persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

/// Job the persona wants done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

/// A document listed in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
}

/// Ranking request: persona, job, and documents to search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    pub documents: Vec<DocumentRef>,
}

impl Request {
    /// Parse a request from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Query string: role and task joined by one space.
    pub fn query(&self) -> String {
        format!("{} {}", self.persona.role, self.job_to_be_done.task)
    }

    /// File names of the requested documents, in request order.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// ISO-8601 timestamp
    pub processing_timestamp: String,
}

/// One entry of `extracted_sections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    /// One-based page number
    pub page_number: usize,
}

/// One entry of `subsection_analysis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    /// One-based page number
    pub page_number: usize,
}

/// The ranked output for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingReport {
    pub metadata: ReportMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl RankingReport {
    /// Build the report for `request` from ranked sections, best first.
    pub fn new(
        request: &Request,
        ranked: &[RankedSection],
        processing_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                input_documents: request.filenames(),
                persona: request.persona.role.clone(),
                job_to_be_done: request.job_to_be_done.task.clone(),
                processing_timestamp: processing_timestamp.into(),
            },
            extracted_sections: ranked
                .iter()
                .map(|r| ExtractedSection {
                    document: r.document.clone(),
                    section_title: r.title.clone(),
                    importance_rank: r.importance_rank,
                    page_number: r.page_number,
                })
                .collect(),
            subsection_analysis: ranked
                .iter()
                .map(|r| SubsectionAnalysis {
                    document: r.document.clone(),
                    refined_text: r.text.clone(),
                    page_number: r.page_number,
                })
                .collect(),
        }
    }
}
