//! Heuristic recovery of structure from free-text narrative replies.
//!
//! The narrative generator is asked for bold-labelled sections
//! (`**VISÃO GERAL**: ...`) but nothing guarantees it complies. Extraction is
//! therefore best-effort: it never fails, and anything not found is simply
//! absent or empty in the [`NarrativeResult`], leaving default copy to the
//! caller.

mod extract;

pub use extract::{extract_bullets, extract_key_sentences, extract_section};

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;

pub const SECTION_OVERVIEW: &str = "VISÃO GERAL";
pub const SECTION_PATTERNS: &str = "PADRÕES IDENTIFICADOS";
pub const SECTION_ANOMALIES: &str = "ANOMALIAS";
pub const SECTION_OPPORTUNITIES: &str = "OPORTUNIDADES";
pub const SECTION_RECOMMENDATIONS: &str = "RECOMENDAÇÕES";

/// Labels the analysis prompt asks the generator to produce.
pub const DEFAULT_SECTION_LABELS: [&str; 5] = [
    SECTION_OVERVIEW,
    SECTION_PATTERNS,
    SECTION_ANOMALIES,
    SECTION_OPPORTUNITIES,
    SECTION_RECOMMENDATIONS,
];

/// Structure recovered from a narrative reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeResult {
    /// Matched sections only, keyed by the requested label.
    pub sections: BTreeMap<String, String>,
    pub bullet_items: Vec<String>,
    pub key_sentences: Vec<String>,
}

impl NarrativeResult {
    pub fn section(&self, label: &str) -> Option<&str> {
        self.sections.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.bullet_items.is_empty() && self.key_sentences.is_empty()
    }
}

/// Extracts [`NarrativeResult`] values using the bounds of an [`AnalysisConfig`].
pub struct NarrativeExtractor<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> NarrativeExtractor<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Extract the given section labels, bullets and key sentences from `text`.
    pub fn extract<S: AsRef<str>>(&self, text: &str, labels: &[S]) -> NarrativeResult {
        let sections: BTreeMap<String, String> = labels
            .iter()
            .filter_map(|label| {
                let label = label.as_ref();
                extract_section(text, label).map(|body| (label.to_string(), body))
            })
            .collect();

        let result = NarrativeResult {
            sections,
            bullet_items: extract_bullets(text, self.config.bullet_min_chars, self.config.bullet_limit),
            key_sentences: extract_key_sentences(
                text,
                self.config.sentence_min_chars,
                self.config.sentence_limit,
            ),
        };

        debug!(
            "Extracted {}/{} sections, {} bullets, {} key sentences",
            result.sections.len(),
            labels.len(),
            result.bullet_items.len(),
            result.key_sentences.len()
        );

        result
    }

    /// Extract the five sections the analysis prompt requests.
    pub fn extract_default(&self, text: &str) -> NarrativeResult {
        self.extract(text, &DEFAULT_SECTION_LABELS)
    }
}
