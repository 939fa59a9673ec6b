use serde::{Deserialize, Serialize};

/// Style-guide rule family a violation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    ForbiddenTerm,
    Pronoun,
    FirstPerson,
    Filler,
    PassiveVoice,
}

impl Category {
    /// All categories in scan order
    pub const ALL: [Category; 5] = [
        Category::ForbiddenTerm,
        Category::Pronoun,
        Category::FirstPerson,
        Category::Filler,
        Category::PassiveVoice,
    ];

    /// Stable kebab-case identifier, used for CSS classes and data attributes
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ForbiddenTerm => "forbidden-term",
            Category::Pronoun => "pronoun",
            Category::FirstPerson => "first-person",
            Category::Filler => "filler",
            Category::PassiveVoice => "passive-voice",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged range of a region's text.
///
/// `start` and `end` are UTF-16 code-unit offsets into the scanned text,
/// the same unit the page's own string APIs use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationSpan {
    pub start: usize,
    pub end: usize,
    pub original: String, // Matched text, casing preserved
    pub category: Category,
    pub message: String,
    pub suggestion: String,
}

impl ViolationSpan {
    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the two half-open ranges share at least one code unit
    pub fn overlaps(&self, other: &ViolationSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Tooltip text shown on the highlight marker
    pub fn tooltip(&self) -> String {
        format!("{}. Suggestion: {}", self.message, self.suggestion)
    }
}

/// Capability class an editable region was discovered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionKind {
    EditableBlock,
    GenericEditable,
    TextArea,
    TextInput,
}

impl RegionKind {
    /// Form controls hold their text in a value, not in text leaves
    pub fn is_form_control(&self) -> bool {
        matches!(self, RegionKind::TextArea | RegionKind::TextInput)
    }
}

/// Display-oriented digest of one violation, returned to the popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationSummary {
    pub category: Category,
    pub message: String,
    pub suggestion: String,
    pub original: String,
    pub element_type: String, // e.g. "DIV", "TEXTAREA"
    pub text_preview: String, // Up to 20 code units of context on each side
}

/// Result of one analysis pass, as reported across the message boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub violation_count: usize,
    pub region_count: usize,
    pub highlighted_count: usize,
    pub violations: Vec<ViolationSummary>,
    pub checked_at: u64,
}
