//! Text Region Locator
//!
//! Finds the editable text regions of a page: rich editor blocks first, then
//! any other editable element, then textareas and text inputs. Every logical
//! region is reported once; the kept set never contains two regions where
//! one lies inside the other.

use crate::config::LocatorConfig;
use crate::dom::{ancestors, is_editable, rendered_text, Dom, NodeKind};
use crate::error::LocateError;
use shared_types::text::utf16_len;
use shared_types::RegionKind;
use tracing::{debug, warn};

/// One editable region and its trimmed text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion<N> {
    pub element: N,
    pub kind: RegionKind,
    /// Trimmed rendered text (or form value)
    pub text: String,
    /// UTF-16 units trimmed from the start of the raw text
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Locator {
    config: LocatorConfig,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Enumerate the distinct text regions below `root`, in discovery order
    pub fn locate<D: Dom>(&self, dom: &D, root: &D::Node) -> Vec<TextRegion<D::Node>> {
        let mut classes: Vec<(&str, RegionKind)> = self
            .config
            .rich_block_selectors
            .iter()
            .map(|s| (s.as_str(), RegionKind::EditableBlock))
            .collect();
        classes.push((
            self.config.generic_editable_selector.as_str(),
            RegionKind::GenericEditable,
        ));
        classes.push((self.config.textarea_selector.as_str(), RegionKind::TextArea));
        classes.push((self.config.text_input_selector.as_str(), RegionKind::TextInput));

        let mut seen: Vec<D::Node> = Vec::new();
        let mut kept: Vec<TextRegion<D::Node>> = Vec::new();

        for (selector, kind) in classes {
            let candidates = match dom.query_all(root, selector) {
                Ok(nodes) => nodes,
                Err(e) => {
                    warn!(selector, error = %e, "selector failed, skipping");
                    continue;
                }
            };

            for element in candidates {
                if seen.contains(&element) {
                    continue;
                }
                seen.push(element.clone());

                match self.candidate(dom, element, kind) {
                    Ok(Some(region)) => keep(dom, &mut kept, region),
                    Ok(None) => {}
                    Err(e) => warn!(selector, error = %e, "dropping candidate"),
                }
            }
        }

        debug!(
            candidates = seen.len(),
            regions = kept.len(),
            "located text regions"
        );
        kept
    }

    /// Turn one element into a region, or `None` when it does not qualify
    fn candidate<D: Dom>(
        &self,
        dom: &D,
        element: D::Node,
        kind: RegionKind,
    ) -> Result<Option<TextRegion<D::Node>>, LocateError> {
        if dom.node_kind(&element) != NodeKind::Element {
            return Err(LocateError::NotAnElement);
        }

        let raw = if kind.is_form_control() {
            dom.form_value(&element).unwrap_or_default()
        } else {
            if kind == RegionKind::GenericEditable && !is_editable(dom, &element) {
                return Ok(None);
            }
            // Nested editables belong to their outermost editing host
            if ancestors(dom, &element)
                .iter()
                .any(|a| is_editable(dom, a))
            {
                return Ok(None);
            }
            rendered_text(dom, &element)
        };

        let trimmed_start = raw.trim_start();
        let text = trimmed_start.trim_end();
        if text.is_empty() {
            return Ok(None);
        }
        let len = utf16_len(text);
        if len >= self.config.max_region_chars {
            debug!(len, "region too large, skipping");
            return Ok(None);
        }

        Ok(Some(TextRegion {
            element,
            kind,
            text: text.to_string(),
            offset: utf16_len(&raw[..raw.len() - trimmed_start.len()]),
        }))
    }
}

/// Containment resolution against the regions kept so far
fn keep<D: Dom>(dom: &D, kept: &mut Vec<TextRegion<D::Node>>, region: TextRegion<D::Node>) {
    if kept
        .iter()
        .any(|k| dom.contains(&k.element, &region.element))
    {
        return;
    }
    kept.retain(|k| !dom.contains(&region.element, &k.element));
    kept.push(region);
}
