//! Message envelope exchanged between the popup and the content script
//!
//! Requests are JSON objects tagged by an `action` field. Every request gets a
//! response with a `success` flag; failures carry an `error` string instead of
//! propagating.

use crate::types::{AnalysisSummary, ViolationSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inbound request kinds the content script understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Ping,
    Analyze,
    Clear,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Unknown action")]
    UnknownAction(String),
}

impl Request {
    /// Parse a request from its JSON form
    pub fn parse(json: &str) -> Result<Self, RequestError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| RequestError::Malformed(e.to_string()))?;

        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .ok_or_else(|| RequestError::Malformed("missing \"action\" field".to_string()))?;

        match action {
            "ping" => Ok(Request::Ping),
            "analyze" => Ok(Request::Analyze),
            "clear" => Ok(Request::Clear),
            other => Err(RequestError::UnknownAction(other.to_string())),
        }
    }
}

/// Outbound response; absent fields are omitted on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<ViolationSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Plain acknowledgment
    pub fn ack() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Answer to `ping`
    pub fn loaded() -> Self {
        Self {
            success: true,
            loaded: Some(true),
            ..Default::default()
        }
    }

    /// Answer to `analyze`
    pub fn analyzed(summary: AnalysisSummary) -> Self {
        Self {
            success: true,
            violation_count: Some(summary.violation_count),
            violations: Some(summary.violations),
            ..Default::default()
        }
    }

    /// Structured failure
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":\"Failed to serialize response: {}\"}}",
                e.to_string().replace('"', "'")
            )
        })
    }
}
