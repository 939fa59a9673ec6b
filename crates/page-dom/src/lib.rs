//! Page tree access, text region discovery and in-place highlighting
//!
//! Everything here is written against the [`Dom`] trait so the same locator
//! and highlighter run on a live browser page and on the arena [`Document`].

pub mod arena;
pub mod config;
pub mod dom;
pub mod error;
pub mod highlighter;
pub mod html;
pub mod locator;
pub mod selector;

pub use arena::{Document, NodeData, NodeId};
pub use config::{HighlightConfig, LocatorConfig, MAX_REGION_CHARS};
pub use dom::{Dom, NodeKind, Rendered};
pub use error::{DomError, HighlightError, LocateError};
pub use highlighter::{HighlightHandle, Highlighter};
pub use locator::{Locator, TextRegion};
pub use selector::SelectorList;
