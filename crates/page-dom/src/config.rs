//! Fixed selector tables and marker settings

/// Regions at or above this many UTF-16 units are skipped
pub const MAX_REGION_CHARS: usize = 50_000;

/// Rich editable blocks, most specific editor markup included
pub const RICH_BLOCK_SELECTORS: &[&str] = &[
    r#"div[contenteditable="true"]"#,
    r#"div.notion-selectable[contenteditable="true"]"#,
    r#"div[data-content-editable-root="true"]"#,
    r#"div.notion-page-content [contenteditable="true"]"#,
];

pub const GENERIC_EDITABLE_SELECTOR: &str = "[contenteditable]";

pub const TEXTAREA_SELECTOR: &str = "textarea";

pub const TEXT_INPUT_SELECTOR: &str =
    r#"input[type="text"], input[type="email"], input[type="search"]"#;

/// Where the locator looks for candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    pub rich_block_selectors: Vec<String>,
    pub generic_editable_selector: String,
    pub textarea_selector: String,
    pub text_input_selector: String,
    pub max_region_chars: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            rich_block_selectors: RICH_BLOCK_SELECTORS.iter().map(|s| s.to_string()).collect(),
            generic_editable_selector: GENERIC_EDITABLE_SELECTOR.to_string(),
            textarea_selector: TEXTAREA_SELECTOR.to_string(),
            text_input_selector: TEXT_INPUT_SELECTOR.to_string(),
            max_region_chars: MAX_REGION_CHARS,
        }
    }
}

/// How highlight markers are built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Shared class on every marker; `clear_all` sweeps by it
    pub marker_class: String,
    /// Prefix for the per-category class (`sg-pronoun`, ...)
    pub class_prefix: String,
    pub marker_tag: String,
    /// Used when a range crosses element boundaries
    pub fallback_tag: String,
    pub category_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            marker_class: "sg-violation".to_string(),
            class_prefix: "sg-".to_string(),
            marker_tag: "mark".to_string(),
            fallback_tag: "span".to_string(),
            category_attribute: "data-violation-type".to_string(),
        }
    }
}

impl HighlightConfig {
    /// Full class attribute for a marker of the given category
    pub fn class_list(&self, category: &str) -> String {
        format!("{} {}{}", self.marker_class, self.class_prefix, category)
    }
}
