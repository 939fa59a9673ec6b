//! Client for the remote page-review service
//!
//! `GET {api_base}/pages` lists candidate pages and `POST {api_base}/process`
//! asks the service to review one of them. Response checks are plain functions
//! over status, headers and body text so they can be tested natively.

use serde::{Deserialize, Serialize};
use shared_types::text::utf16_slice_clamped;
use shared_types::PageListing;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://contrary-editing-demo-production.up.railway.app";

/// Characters of an unexpected body quoted back in errors
const BODY_PREVIEW: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub api_base: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl RemoteConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    pub fn pages_url(&self) -> String {
        format!("{}/pages", self.api_base.trim_end_matches('/'))
    }

    pub fn process_url(&self) -> String {
        format!("{}/process", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("HTTP error! status: {status}, message: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected response type: {content_type}. Response: {preview}")]
    UnexpectedContentType {
        content_type: String,
        preview: String,
    },

    #[error("Invalid response format: {0}")]
    InvalidFormat(&'static str),

    #[error("Invalid JSON response: {0}")]
    Json(String),

    #[error("{0}")]
    Service(String),
}

/// Validate a `GET /pages` response
pub fn parse_page_listing(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<PageListing, RemoteError> {
    if !(200..300).contains(&status) {
        return Err(RemoteError::Http {
            status,
            message: body.to_string(),
        });
    }

    if !content_type
        .map(|c| c.contains("application/json"))
        .unwrap_or(false)
    {
        return Err(RemoteError::UnexpectedContentType {
            content_type: content_type.unwrap_or("unknown").to_string(),
            preview: utf16_slice_clamped(body, 0, BODY_PREVIEW).to_string(),
        });
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| RemoteError::Json(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or(RemoteError::InvalidFormat("expected an object"))?;

    match object.get("pages") {
        None | Some(serde_json::Value::Null) => Ok(PageListing::default()),
        Some(serde_json::Value::Array(pages)) => Ok(PageListing {
            pages: pages.clone(),
        }),
        Some(_) => Err(RemoteError::InvalidFormat("pages should be an array")),
    }
}

/// Validate a `POST /process` response, returning the service's JSON result
pub fn parse_process_result(status: u16, body: &str) -> Result<serde_json::Value, RemoteError> {
    let parsed = serde_json::from_str::<serde_json::Value>(body);

    if !(200..300).contains(&status) {
        let detail = parsed
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.is_empty());
        return Err(match detail {
            Some(detail) => RemoteError::Service(detail),
            None => RemoteError::Service(format!("HTTP error! status: {}", status)),
        });
    }

    parsed.map_err(|e| RemoteError::Json(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
pub use transport::{fetch_pages, process_page};

#[cfg(target_arch = "wasm32")]
mod transport {
    use super::*;
    use anyhow::{anyhow, Context, Result};
    use shared_types::{ProcessOptions, ProcessPageRequest};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    fn js_error(e: JsValue) -> anyhow::Error {
        anyhow!(crate::live_dom::describe_js(&e))
    }

    /// Status, content type and body text of a finished fetch
    async fn send(request: &Request) -> Result<(u16, Option<String>, String)> {
        let window = web_sys::window().ok_or_else(|| anyhow!("No window"))?;
        let response = JsFuture::from(window.fetch_with_request(request))
            .await
            .map_err(js_error)?;
        let response: Response = response.dyn_into().map_err(js_error)?;

        let content_type = response.headers().get("content-type").map_err(js_error)?;
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok((
            response.status(),
            content_type,
            text.as_string().unwrap_or_default(),
        ))
    }

    fn get(url: &str) -> Result<Request> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        Request::new_with_str_and_init(url, &opts).map_err(js_error)
    }

    fn post_json(url: &str, body: &str) -> Result<Request> {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(body));

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
        Ok(request)
    }

    /// List the pages the service can review
    pub async fn fetch_pages(config: &RemoteConfig) -> Result<PageListing> {
        let request = get(&config.pages_url())?;
        let (status, content_type, body) = send(&request)
            .await
            .context("Error fetching pages")?;

        let listing = parse_page_listing(status, content_type.as_deref(), &body)?;
        tracing::debug!(pages = listing.pages.len(), "fetched page listing");
        Ok(listing)
    }

    /// Ask the service to review one page
    pub async fn process_page(
        config: &RemoteConfig,
        page_id: &str,
        options: &ProcessOptions,
    ) -> Result<serde_json::Value> {
        let payload = ProcessPageRequest::new(page_id, options);
        let body = serde_json::to_string(&payload).context("Failed to serialize request")?;

        let request = post_json(&config.process_url(), &body)?;
        let (status, _, body) = send(&request)
            .await
            .context("Error processing page")?;

        tracing::debug!(page_id, status, model = %payload.model, "processed page");
        Ok(parse_process_result(status, &body)?)
    }
}
