//! Payloads of the remote analysis service
//!
//! The service lists candidate pages and runs a deeper review of one page,
//! posting its findings back into the document as comments.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "openai";

/// Caller-supplied knobs for a process request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub auto_select_child: Option<bool>,
}

/// Body of `POST /process`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessPageRequest {
    pub page_id: String,
    pub model: String,
    pub auto_select_child: bool,
}

impl ProcessPageRequest {
    /// Fill unset options with the service defaults
    pub fn new(page_id: &str, options: &ProcessOptions) -> Self {
        Self {
            page_id: page_id.to_string(),
            model: options
                .model
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            auto_select_child: options.auto_select_child.unwrap_or(true),
        }
    }
}

/// Body of `GET /pages`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageListing {
    pub pages: Vec<serde_json::Value>,
}
