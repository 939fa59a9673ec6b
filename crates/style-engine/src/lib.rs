//! Rule-based style scanner
//!
//! `scan` is a pure function from text to violation spans. Rule families run
//! independently over the whole text and their results are concatenated in a
//! fixed order; spans from different families may overlap.

pub mod patterns;
pub mod rules;

use shared_types::{Category, ViolationSpan};

/// Scanner entry point
#[derive(Debug, Clone, Copy)]
pub struct StyleEngine;

impl StyleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Scan text and return every violation, grouped by rule family
    pub fn scan(&self, text: &str) -> Vec<ViolationSpan> {
        let mut violations = Vec::new();

        violations.extend(rules::forbidden::check_forbidden_terms(text));
        violations.extend(rules::pronoun::check_pronouns(text));
        violations.extend(rules::first_person::check_first_person(text));
        violations.extend(rules::filler::check_filler_words(text));
        violations.extend(rules::passive::check_passive_voice(text));

        tracing::debug!(
            chars = text.len(),
            violations = violations.len(),
            "scanned text"
        );
        violations
    }

    /// Per-category counts for a text
    pub fn scan_summary(&self, text: &str) -> ScanSummary {
        ScanSummary::from_spans(&self.scan(text))
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan with a default engine
pub fn scan(text: &str) -> Vec<ViolationSpan> {
    StyleEngine::new().scan(text)
}

/// Violation counts by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanSummary {
    counts: [usize; 5],
}

impl ScanSummary {
    pub fn from_spans(spans: &[ViolationSpan]) -> Self {
        let mut summary = Self::default();
        for span in spans {
            summary.counts[Self::slot(span.category)] += 1;
        }
        summary
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts[Self::slot(category)]
    }

    /// Combined counts of two summaries
    pub fn merge(&self, other: &ScanSummary) -> ScanSummary {
        let mut counts = self.counts;
        for (slot, extra) in counts.iter_mut().zip(other.counts) {
            *slot += extra;
        }
        ScanSummary { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    fn slot(category: Category) -> usize {
        Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default()
    }
}
