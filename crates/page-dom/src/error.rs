use thiserror::Error;

/// Failures raised while reading or mutating a rendering tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Node is not a text node")]
    NotText,

    #[error("Node is not an element")]
    NotElement,

    #[error("Offset {offset} is outside a text node of length {len}")]
    IndexSize { offset: usize, len: usize },

    #[error("Node is not attached to a parent")]
    Detached,

    #[error("Reference node is not a child of the parent")]
    NotFound,

    #[error("Insertion would make a node its own ancestor")]
    HierarchyRequest,

    #[error("DOM call failed: {0}")]
    Js(String),
}

/// Failures while turning one candidate element into a region
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("Candidate is not an element")]
    NotAnElement,

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Failures while highlighting one span
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("No text range for offsets {start}..{end}")]
    RangeNotFound { start: usize, end: usize },

    #[error("Span {start}..{end} overlaps an applied highlight")]
    Overlap { start: usize, end: usize },

    #[error("Range crosses element boundaries")]
    CannotSurround,

    #[error("Span {start}..{end} crosses a line break")]
    CrossesLineBreak { start: usize, end: usize },

    #[error("Span {start}..{end} would remove non-rendered content")]
    HiddenContent { start: usize, end: usize },

    #[error(transparent)]
    Dom(#[from] DomError),
}
