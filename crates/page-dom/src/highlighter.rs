//! Span-to-Range Highlighter
//!
//! Maps violation spans (UTF-16 offsets into a region's trimmed text) onto the
//! region's text leaves and wraps each one in a marker element. The leaf index
//! is frozen before any mutation and spans are applied from the end of the
//! text backwards, so a split or wrap never shifts an entry still to be used.
//!
//! Line breaks from block boundaries and `<br>` take part in the offsets but
//! are backed by no node, so a span can neither start, end nor cross one.
//!
//! When a span's ends sit under different parents the selected content is
//! pulled out and replaced by a fallback marker holding its text.

use crate::config::HighlightConfig;
use crate::dom::{
    has_hidden_content, next_in_preorder, rendered_pieces, rendered_text, Dom, NodeKind,
    Rendered, LINE_BREAK,
};
use crate::error::HighlightError;
use crate::locator::TextRegion;
use shared_types::text::utf16_len;
use shared_types::{Category, ViolationSpan};
use tracing::{debug, warn};

/// One applied marker
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightHandle<N> {
    pub marker: N,
    /// Element of the region the marker was applied in
    pub owner: N,
    pub category: Category,
}

/// Rendered piece with its absolute UTF-16 range in the region's raw text;
/// `node` is `None` for line breaks
#[derive(Debug, Clone)]
struct LeafSpan<N> {
    node: Option<N>,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Wrap every span that can be placed; failures are logged and skipped
    pub fn apply<D: Dom>(
        &self,
        dom: &mut D,
        region: &TextRegion<D::Node>,
        spans: &[ViolationSpan],
    ) -> Vec<HighlightHandle<D::Node>> {
        if region.kind.is_form_control() {
            debug!(spans = spans.len(), "form control, nothing to wrap");
            return Vec::new();
        }

        let mut ordered: Vec<&ViolationSpan> = spans.iter().collect();
        ordered.sort_by(|a, b| b.start.cmp(&a.start));

        let leaves = self.leaf_index(dom, &region.element);
        let mut applied: Vec<&ViolationSpan> = Vec::new();
        let mut handles = Vec::new();

        for span in ordered {
            match self.apply_span(dom, region, &leaves, span, &applied) {
                Ok(marker) => {
                    applied.push(span);
                    handles.push(HighlightHandle {
                        marker,
                        owner: region.element.clone(),
                        category: span.category,
                    });
                }
                Err(e) => warn!(
                    category = span.category.as_str(),
                    original = %span.original,
                    error = %e,
                    "could not highlight span"
                ),
            }
        }

        debug!(
            spans = spans.len(),
            applied = handles.len(),
            "highlighted region"
        );
        handles
    }

    fn leaf_index<D: Dom>(&self, dom: &D, element: &D::Node) -> Vec<LeafSpan<D::Node>> {
        let mut cursor = 0;
        rendered_pieces(dom, element, Some(&self.config.marker_class))
            .into_iter()
            .map(|piece| {
                let (node, len) = match piece {
                    Rendered::Leaf(node) => {
                        let len = dom.text_data(&node).map(|t| utf16_len(&t)).unwrap_or(0);
                        (Some(node), len)
                    }
                    Rendered::Break => (None, utf16_len(LINE_BREAK)),
                };
                let leaf = LeafSpan {
                    node,
                    start: cursor,
                    end: cursor + len,
                };
                cursor += len;
                leaf
            })
            .collect()
    }

    fn apply_span<D: Dom>(
        &self,
        dom: &mut D,
        region: &TextRegion<D::Node>,
        leaves: &[LeafSpan<D::Node>],
        span: &ViolationSpan,
        applied: &[&ViolationSpan],
    ) -> Result<D::Node, HighlightError> {
        if applied.iter().any(|a| a.overlaps(span)) {
            return Err(HighlightError::Overlap {
                start: span.start,
                end: span.end,
            });
        }

        let start = span.start + region.offset;
        let end = span.end + region.offset;
        let not_found = HighlightError::RangeNotFound {
            start: span.start,
            end: span.end,
        };
        if start >= end {
            return Err(not_found);
        }

        if leaves
            .iter()
            .any(|l| l.node.is_none() && l.start < end && l.end > start)
        {
            return Err(HighlightError::CrossesLineBreak {
                start: span.start,
                end: span.end,
            });
        }

        let (start_node, start_offset) = leaves
            .iter()
            .find_map(|l| match &l.node {
                Some(node) if start >= l.start && start < l.end => Some((node.clone(), start - l.start)),
                _ => None,
            })
            .ok_or_else(|| not_found.clone())?;
        let (end_node, end_offset) = leaves
            .iter()
            .find_map(|l| match &l.node {
                Some(node) if l.start < end && end <= l.end => Some((node.clone(), end - l.start)),
                _ => None,
            })
            .ok_or(not_found)?;

        let bounds = Bounds {
            start_node,
            start_offset,
            end_node,
            end_offset,
        };

        match self.surround(dom, &bounds, span) {
            Err(HighlightError::CannotSurround) => {
                debug!(
                    original = %span.original,
                    "range crosses elements, using fallback marker"
                );
                self.replace_with_marker(dom, &region.element, &bounds, span)
            }
            other => other,
        }
    }

    fn build_marker<D: Dom>(
        &self,
        dom: &mut D,
        tag: &str,
        span: &ViolationSpan,
    ) -> Result<D::Node, HighlightError> {
        let category = span.category.as_str();
        let marker = dom.create_element(tag)?;
        dom.set_attribute(&marker, "class", &self.config.class_list(category))?;
        dom.set_attribute(&marker, &self.config.category_attribute, category)?;
        dom.set_attribute(&marker, "title", &span.tooltip())?;
        Ok(marker)
    }

    /// Wrap the range when both ends share a parent
    fn surround<D: Dom>(
        &self,
        dom: &mut D,
        bounds: &Bounds<D::Node>,
        span: &ViolationSpan,
    ) -> Result<D::Node, HighlightError> {
        let parent = dom
            .parent(&bounds.start_node)
            .ok_or(HighlightError::CannotSurround)?;
        if dom.parent(&bounds.end_node).as_ref() != Some(&parent) {
            return Err(HighlightError::CannotSurround);
        }

        let (first, last) = split_bounds(dom, bounds)?;

        let mut run = vec![first.clone()];
        let mut current = first.clone();
        while current != last {
            current = dom.next_sibling(&current).ok_or(HighlightError::RangeNotFound {
                start: span.start,
                end: span.end,
            })?;
            run.push(current.clone());
        }

        let marker = self.build_marker(dom, &self.config.marker_tag, span)?;
        dom.insert_before(&parent, &marker, Some(&first))?;
        for node in &run {
            dom.insert_before(&marker, node, None)?;
        }
        Ok(marker)
    }

    /// Pull the selected content out and put a fallback marker holding its
    /// text at the start point
    fn replace_with_marker<D: Dom>(
        &self,
        dom: &mut D,
        scope: &D::Node,
        bounds: &Bounds<D::Node>,
        span: &ViolationSpan,
    ) -> Result<D::Node, HighlightError> {
        let (first, last) = split_bounds(dom, bounds)?;
        let parent = dom.parent(&first).ok_or(HighlightError::RangeNotFound {
            start: span.start,
            end: span.end,
        })?;

        // Top-level nodes fully inside the range; ancestors of `last` are
        // only partially selected and stay
        let mut doomed = Vec::new();
        let mut current = Some(first.clone());
        while let Some(node) = current {
            if dom.contains(&node, &last) {
                if node == last {
                    doomed.push(node);
                    break;
                }
                current = next_in_preorder(dom, &node, scope);
            } else {
                current = next_after_subtree(dom, &node, scope);
                doomed.push(node);
            }
        }
        if doomed.last() != Some(&last) {
            return Err(HighlightError::RangeNotFound {
                start: span.start,
                end: span.end,
            });
        }

        if doomed.iter().any(|n| has_hidden_content(dom, n)) {
            return Err(HighlightError::HiddenContent {
                start: span.start,
                end: span.end,
            });
        }

        let removed: String = doomed
            .iter()
            .map(|n| match dom.node_kind(n) {
                NodeKind::Text => dom.text_data(n).unwrap_or_default(),
                _ => rendered_text(dom, n),
            })
            .collect();
        if removed != span.original {
            debug!(
                expected = %span.original,
                removed = %removed,
                "fallback marker text differs from span"
            );
        }

        let marker = self.build_marker(dom, &self.config.fallback_tag, span)?;
        let text = dom.create_text(&removed)?;
        dom.insert_before(&marker, &text, None)?;
        dom.insert_before(&parent, &marker, Some(&first))?;
        for node in &doomed {
            dom.remove(node)?;
        }
        Ok(marker)
    }

    /// Unwrap the given markers, returning how many were removed
    pub fn clear<D: Dom>(&self, dom: &mut D, handles: &[HighlightHandle<D::Node>]) -> usize {
        let mut cleared = 0;
        for handle in handles.iter().rev() {
            match unwrap_marker(dom, &handle.marker) {
                Ok(()) => cleared += 1,
                Err(e) => debug!(error = %e, "marker already gone"),
            }
        }
        cleared
    }

    /// Unwrap every marker below `root`, including ones from earlier passes
    pub fn clear_all<D: Dom>(&self, dom: &mut D, root: &D::Node) -> usize {
        let selector = format!(".{}", self.config.marker_class);
        let markers = match dom.query_all(root, &selector) {
            Ok(markers) => markers,
            Err(e) => {
                warn!(error = %e, "could not look up markers");
                return 0;
            }
        };

        // Innermost first so nested markers fold into their parents' text
        let mut cleared = 0;
        for marker in markers.iter().rev() {
            match unwrap_marker(dom, marker) {
                Ok(()) => cleared += 1,
                Err(e) => warn!(error = %e, "could not remove marker"),
            }
        }
        if cleared > 0 {
            debug!(cleared, "cleared markers");
        }
        cleared
    }
}

struct Bounds<N> {
    start_node: N,
    start_offset: usize,
    end_node: N,
    end_offset: usize,
}

/// Split the boundary leaves so the range starts and ends on node edges.
/// Returns the first and last nodes inside the range.
fn split_bounds<D: Dom>(
    dom: &mut D,
    bounds: &Bounds<D::Node>,
) -> Result<(D::Node, D::Node), HighlightError> {
    let end_len = dom
        .text_data(&bounds.end_node)
        .map(|t| utf16_len(&t))
        .unwrap_or(0);
    if bounds.end_offset < end_len {
        dom.split_text(&bounds.end_node, bounds.end_offset)?;
    }

    let first = if bounds.start_offset > 0 {
        dom.split_text(&bounds.start_node, bounds.start_offset)?
    } else {
        bounds.start_node.clone()
    };
    let last = if bounds.start_node == bounds.end_node {
        first.clone()
    } else {
        bounds.end_node.clone()
    };
    Ok((first, last))
}

/// Next node in document order that is not inside `node`
fn next_after_subtree<D: Dom>(dom: &D, node: &D::Node, root: &D::Node) -> Option<D::Node> {
    let mut current = node.clone();
    loop {
        if current == *root {
            return None;
        }
        if let Some(sibling) = dom.next_sibling(&current) {
            return Some(sibling);
        }
        current = dom.parent(&current)?;
    }
}

/// Move a marker's children back in its place and merge adjacent text
fn unwrap_marker<D: Dom>(dom: &mut D, marker: &D::Node) -> Result<(), HighlightError> {
    let parent = dom
        .parent(marker)
        .ok_or(crate::error::DomError::Detached)?;
    for child in dom.children(marker) {
        dom.insert_before(&parent, &child, Some(marker))?;
    }
    dom.remove(marker)?;
    dom.normalize(&parent)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::rendered_text;
    use crate::{Document, Locator, NodeId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn span(start: usize, end: usize, original: &str, category: Category) -> ViolationSpan {
        ViolationSpan {
            start,
            end,
            original: original.to_string(),
            category,
            message: "msg".to_string(),
            suggestion: "fix".to_string(),
        }
    }

    fn single_region(doc: &Document) -> TextRegion<NodeId> {
        Locator::new()
            .locate(doc, &doc.root())
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_apply_then_clear_restores_text() {
        let mut doc = Document::parse_html(r#"<div contenteditable="true">very comprehensive</div>"#);
        let region = single_region(&doc);
        let spans = vec![
            span(0, 4, "very", Category::Filler),
            span(5, 18, "comprehensive", Category::ForbiddenTerm),
        ];

        let highlighter = Highlighter::new();
        let handles = highlighter.apply(&mut doc, &region, &spans);
        assert_eq!(handles.len(), 2);
        assert_eq!(
            doc.to_html(region.element),
            r#"<div contenteditable="true"><mark class="sg-violation sg-filler" data-violation-type="filler" title="msg. Suggestion: fix">very</mark> <mark class="sg-violation sg-forbidden-term" data-violation-type="forbidden-term" title="msg. Suggestion: fix">comprehensive</mark></div>"#
        );

        assert_eq!(highlighter.clear(&mut doc, &handles), 2);
        assert_eq!(doc.text_content(&region.element), "very comprehensive");
        assert_eq!(doc.children(&region.element).len(), 1);

        assert_eq!(highlighter.clear(&mut doc, &handles), 0);
        assert_eq!(doc.text_content(&region.element), "very comprehensive");
    }

    #[test]
    fn test_clear_without_markers_is_a_no_op() {
        let mut doc = Document::parse_html(r#"<div id=d contenteditable="true">plain <b>text</b></div>"#);
        let before = doc.to_html(doc.root());
        let highlighter = Highlighter::new();

        assert_eq!(highlighter.clear(&mut doc, &[]), 0);
        assert_eq!(highlighter.clear_all(&mut doc, &NodeId::ROOT), 0);
        assert_eq!(doc.to_html(doc.root()), before);
    }

    #[test]
    fn test_offsets_account_for_trimmed_whitespace() {
        let mut doc = Document::parse_html("<div contenteditable=\"true\">\n   I agree</div>");
        let region = single_region(&doc);
        assert_eq!(region.offset, 4);

        let handles = Highlighter::new().apply(&mut doc, &region, &[span(0, 1, "I", Category::FirstPerson)]);
        assert_eq!(handles.len(), 1);
        assert_eq!(doc.text_content(&handles[0].marker), "I");
    }

    #[test]
    fn test_span_across_inline_siblings_is_wrapped() {
        let mut doc = Document::parse_html(r#"<p contenteditable="true">as <i>well</i> as</p>"#);
        let region = single_region(&doc);
        let handles = Highlighter::new().apply(
            &mut doc,
            &region,
            &[span(0, 10, "as well as", Category::PassiveVoice)],
        );

        assert_eq!(handles.len(), 1);
        assert_eq!(doc.tag_name(&handles[0].marker).as_deref(), Some("mark"));
        assert_eq!(
            doc.to_html(region.element),
            r#"<p contenteditable="true"><mark class="sg-violation sg-passive-voice" data-violation-type="passive-voice" title="msg. Suggestion: fix">as <i>well</i> as</mark></p>"#
        );

        // Clearing puts the inline element back
        assert_eq!(Highlighter::new().clear(&mut doc, &handles), 1);
        assert_eq!(
            doc.to_html(region.element),
            r#"<p contenteditable="true">as <i>well</i> as</p>"#
        );
    }

    #[test]
    fn test_cross_element_span_uses_fallback() {
        let mut doc = Document::parse_html(r#"<p contenteditable="true">has <b>been there</b></p>"#);
        let region = single_region(&doc);
        let highlighter = Highlighter::new();
        let handles = highlighter.apply(
            &mut doc,
            &region,
            &[span(0, 8, "has been", Category::PassiveVoice)],
        );

        assert_eq!(handles.len(), 1);
        let marker = handles[0].marker;
        assert_eq!(doc.tag_name(&marker).as_deref(), Some("span"));
        assert_eq!(doc.text_content(&marker), "has been");
        assert_eq!(rendered_text(&doc, &region.element), "has been there");

        highlighter.clear(&mut doc, &handles);
        assert_eq!(rendered_text(&doc, &region.element), "has been there");
    }

    #[test]
    fn test_spans_in_separate_blocks_are_found_and_wrapped() {
        let html = r#"<div contenteditable="true"><p>We are very</p><p>so happy</p></div>"#;
        let mut doc = Document::parse_html(html);
        let region = single_region(&doc);
        assert_eq!(region.text, "We are very\nso happy");

        let spans = style_engine::scan(&region.text);
        let originals: Vec<_> = spans.iter().map(|s| s.original.as_str()).collect();
        assert_eq!(originals, vec!["very", "so"]);

        let highlighter = Highlighter::new();
        let handles = highlighter.apply(&mut doc, &region, &spans);
        assert_eq!(handles.len(), 2);
        let marked: Vec<_> = handles.iter().map(|h| doc.text_content(&h.marker)).collect();
        assert_eq!(marked, vec!["so", "very"]);

        assert_eq!(highlighter.clear(&mut doc, &handles), 2);
        assert_eq!(doc.to_html(doc.root()), html);
    }

    #[test]
    fn test_line_break_separates_words() {
        let mut doc = Document::parse_html(r#"<div contenteditable="true">It is very<br>so good</div>"#);
        let region = single_region(&doc);
        assert_eq!(region.text, "It is very\nso good");

        let spans = style_engine::scan(&region.text);
        let handles = Highlighter::new().apply(&mut doc, &region, &spans);
        let marked: Vec<_> = handles.iter().map(|h| doc.text_content(&h.marker)).collect();
        assert_eq!(marked, vec!["so", "very"]);
    }

    #[test]
    fn test_span_across_line_break_is_skipped() {
        let html = r#"<div contenteditable="true">They<br>are here</div>"#;
        let mut doc = Document::parse_html(html);
        let region = single_region(&doc);
        let handles = Highlighter::new().apply(
            &mut doc,
            &region,
            &[span(0, 8, "They\nare", Category::Pronoun)],
        );

        assert!(handles.is_empty());
        assert_eq!(doc.to_html(doc.root()), html);
    }

    #[test]
    fn test_fallback_leaves_non_rendered_content_alone() {
        let html = r#"<p contenteditable="true">has <b><script>x()</script>been</b> here</p>"#;
        let mut doc = Document::parse_html(html);
        let region = single_region(&doc);
        assert_eq!(region.text, "has been here");

        let highlighter = Highlighter::new();
        let handles = highlighter.apply(
            &mut doc,
            &region,
            &[span(0, 8, "has been", Category::PassiveVoice)],
        );
        assert!(handles.is_empty());
        assert_eq!(doc.to_html(doc.root()), html);

        highlighter.clear(&mut doc, &handles);
        assert_eq!(rendered_text(&doc, &region.element), "has been here");
    }

    #[test]
    fn test_overlapping_span_is_skipped() {
        let mut doc = Document::parse_html(r#"<p contenteditable="true">They has been busy.</p>"#);
        let region = single_region(&doc);
        let handles = Highlighter::new().apply(
            &mut doc,
            &region,
            &[
                span(0, 8, "They has", Category::Pronoun),
                span(5, 13, "has been", Category::PassiveVoice),
            ],
        );

        // Later start goes first; the pronoun span then overlaps it
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].category, Category::PassiveVoice);
        assert_eq!(doc.text_content(&region.element), "They has been busy.");
    }

    #[test]
    fn test_out_of_range_span_is_skipped() {
        let mut doc = Document::parse_html(r#"<p contenteditable="true">short</p>"#);
        let region = single_region(&doc);
        let handles = Highlighter::new().apply(&mut doc, &region, &[span(3, 40, "x", Category::Filler)]);
        assert!(handles.is_empty());
        assert_eq!(doc.to_html(region.element), r#"<p contenteditable="true">short</p>"#);
    }

    #[test]
    fn test_form_controls_are_not_wrapped() {
        let mut doc = Document::parse_html("<textarea>very good</textarea>");
        let region = single_region(&doc);
        let handles = Highlighter::new().apply(&mut doc, &region, &[span(0, 4, "very", Category::Filler)]);
        assert!(handles.is_empty());
    }

    #[test]
    fn test_clear_all_sweeps_stale_markers() {
        let mut doc = Document::parse_html(
            r#"<div contenteditable="true">a <mark class="sg-violation sg-filler">very</mark> b <span class="sg-violation"><mark class="sg-violation">so</mark> x</span></div>"#,
        );
        let cleared = Highlighter::new().clear_all(&mut doc, &NodeId::ROOT);
        assert_eq!(cleared, 3);
        assert_eq!(
            doc.to_html(doc.root()),
            r#"<div contenteditable="true">a very b so x</div>"#
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_apply_then_clear_preserves_text(
            words in proptest::collection::vec(
                prop_oneof![
                    Just("very"), Just("seamless"), Just("I"), Just("they are"),
                    Just("has been"), Just("<b>so</b>"), Just("<i>as well</i> as"),
                    Just("plain"), Just("café"),
                ],
                1..20,
            )
        ) {
            let html = format!(r#"<div contenteditable="true">{}</div>"#, words.join(" "));
            let mut doc = Document::parse_html(&html);
            let region = single_region(&doc);
            let before = rendered_text(&doc, &region.element);

            let spans = style_engine::scan(&region.text);
            let highlighter = Highlighter::new();
            let handles = highlighter.apply(&mut doc, &region, &spans);
            prop_assert_eq!(rendered_text(&doc, &region.element), before.clone());

            highlighter.clear(&mut doc, &handles);
            prop_assert_eq!(rendered_text(&doc, &region.element), before.clone());
            prop_assert_eq!(highlighter.clear_all(&mut doc, &NodeId::ROOT), 0);
            prop_assert_eq!(highlighter.clear(&mut doc, &handles), 0);
            prop_assert_eq!(rendered_text(&doc, &region.element), before);
        }
    }
}
