//! One analysis pass: Locator -> Scanner -> Highlighter
//!
//! Each call starts by sweeping markers left by earlier passes and returns a
//! fresh report. Nothing is carried over between calls.

use page_dom::{Dom, HighlightHandle, Highlighter, Locator, TextRegion};
use shared_types::text::utf16_slice_clamped;
use shared_types::{AnalysisSummary, ViolationSpan, ViolationSummary};
use style_engine::{ScanSummary, StyleEngine};

/// Code units of context kept on each side of a violation
pub const PREVIEW_CONTEXT: usize = 20;

/// Outcome of one pass: what goes back to the caller plus the markers applied
#[derive(Debug, Clone)]
pub struct AnalysisReport<N> {
    pub summary: AnalysisSummary,
    pub handles: Vec<HighlightHandle<N>>,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    locator: Locator,
    engine: StyleEngine,
    highlighter: Highlighter,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(locator: Locator, highlighter: Highlighter) -> Self {
        Self {
            locator,
            engine: StyleEngine::new(),
            highlighter,
        }
    }

    pub fn analyze<D: Dom>(
        &self,
        dom: &mut D,
        root: &D::Node,
        checked_at: u64,
    ) -> AnalysisReport<D::Node> {
        let swept = self.highlighter.clear_all(dom, root);
        if swept > 0 {
            tracing::debug!(swept, "removed markers from a previous pass");
        }

        let regions = self.locator.locate(dom, root);
        let mut violations = Vec::new();
        let mut handles = Vec::new();
        let mut totals = ScanSummary::default();

        for region in &regions {
            let spans = self.engine.scan(&region.text);
            if spans.is_empty() {
                continue;
            }
            totals = totals.merge(&ScanSummary::from_spans(&spans));

            let element_type = dom
                .tag_name(&region.element)
                .unwrap_or_default()
                .to_ascii_uppercase();
            violations.extend(spans.iter().map(|span| summarize(region, &element_type, span)));
            handles.extend(self.highlighter.apply(dom, region, &spans));
        }

        tracing::info!(
            regions = regions.len(),
            violations = violations.len(),
            highlighted = handles.len(),
            forbidden = totals.count(shared_types::Category::ForbiddenTerm),
            pronoun = totals.count(shared_types::Category::Pronoun),
            first_person = totals.count(shared_types::Category::FirstPerson),
            filler = totals.count(shared_types::Category::Filler),
            passive = totals.count(shared_types::Category::PassiveVoice),
            "analysis complete"
        );

        AnalysisReport {
            summary: AnalysisSummary {
                violation_count: violations.len(),
                region_count: regions.len(),
                highlighted_count: handles.len(),
                violations,
                checked_at,
            },
            handles,
        }
    }

    /// Remove every marker below `root`
    pub fn clear<D: Dom>(&self, dom: &mut D, root: &D::Node) -> usize {
        self.highlighter.clear_all(dom, root)
    }
}

fn summarize<N>(region: &TextRegion<N>, element_type: &str, span: &ViolationSpan) -> ViolationSummary {
    ViolationSummary {
        category: span.category,
        message: span.message.clone(),
        suggestion: span.suggestion.clone(),
        original: span.original.clone(),
        element_type: element_type.to_string(),
        text_preview: utf16_slice_clamped(
            &region.text,
            span.start.saturating_sub(PREVIEW_CONTEXT),
            span.end + PREVIEW_CONTEXT,
        )
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_dom::Document;
    use pretty_assertions::assert_eq;
    use shared_types::Category;

    #[test]
    fn test_analyze_reports_and_highlights() {
        let mut doc = Document::parse_html(
            r#"<div class="notion-page-content"><div class="notion-selectable" contenteditable="true">Our platform is truly revolutionary.</div></div><textarea>I think so</textarea>"#,
        );
        let root = doc.root();
        let report = Pipeline::new().analyze(&mut doc, &root, 42);

        let summary = &report.summary;
        assert_eq!(summary.region_count, 2);
        assert_eq!(summary.violation_count, 3);
        assert_eq!(summary.checked_at, 42);
        // Textareas are reported but never wrapped
        assert_eq!(summary.highlighted_count, 1);

        let first = &summary.violations[0];
        assert_eq!(first.category, Category::ForbiddenTerm);
        assert_eq!(first.original, "revolutionary");
        assert_eq!(first.element_type, "DIV");
        assert_eq!(first.text_preview, "r platform is truly revolutionary.");

        let from_textarea: Vec<_> = summary.violations[1..]
            .iter()
            .map(|v| (v.element_type.as_str(), v.original.as_str()))
            .collect();
        assert_eq!(from_textarea, vec![("TEXTAREA", "I"), ("TEXTAREA", "so")]);
    }

    #[test]
    fn test_preview_is_clamped_to_twenty_units() {
        let text = "Plenty of words before the phrase, which is very long, and plenty after it too.";
        let mut doc = Document::parse_html(&format!(r#"<div contenteditable="true">{text}</div>"#));
        let root = doc.root();
        let report = Pipeline::new().analyze(&mut doc, &root, 0);

        let very = report
            .summary
            .violations
            .iter()
            .find(|v| v.original == "very")
            .unwrap();
        assert_eq!(very.text_preview, "he phrase, which is very long, and plenty af");
    }

    #[test]
    fn test_repeated_analysis_does_not_stack_markers() {
        let mut doc = Document::parse_html(r#"<p contenteditable="true">This is very seamless.</p>"#);
        let root = doc.root();
        let pipeline = Pipeline::new();

        let first = pipeline.analyze(&mut doc, &root, 1);
        let html_after_first = doc.to_html(root);
        let second = pipeline.analyze(&mut doc, &root, 2);

        assert_eq!(first.summary.violations, second.summary.violations);
        assert_eq!(doc.to_html(root), html_after_first);
        assert_eq!(pipeline.clear(&mut doc, &root), 2);
        assert_eq!(doc.to_html(root), r#"<p contenteditable="true">This is very seamless.</p>"#);
    }

    #[test]
    fn test_page_without_regions() {
        let mut doc = Document::parse_html("<p>Nothing editable here, very plain.</p>");
        let root = doc.root();
        let report = Pipeline::new().analyze(&mut doc, &root, 0);
        assert_eq!(report.summary.region_count, 0);
        assert_eq!(report.summary.violation_count, 0);
        assert!(report.handles.is_empty());
    }
}
