use serde::Serialize;
use wasm_bindgen::prelude::*;

// Export modules
pub mod content;
pub mod live_dom;
pub mod logging;
pub mod pipeline;
pub mod remote;

// Re-export commonly used items
pub use content::ContentScript;
pub use live_dom::LiveDom;
pub use logging::init_logging;
pub use pipeline::{AnalysisReport, Pipeline};
pub use remote::{parse_page_listing, parse_process_result, RemoteConfig, RemoteError};

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    init_logging(tracing::Level::INFO);
    tracing::info!("Styleguard WASM initialized");
}

/// Plain JS objects rather than `Map`s for nested JSON values
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize result: {}", e)))
}

fn page() -> Result<LiveDom, JsValue> {
    LiveDom::from_window().ok_or_else(|| JsValue::from_str("No document"))
}

/// Content-script side of the extension: answers popup messages against
/// the current page
#[wasm_bindgen]
pub struct StyleGuard {
    script: ContentScript,
}

impl Default for StyleGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl StyleGuard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            script: ContentScript::new(),
        }
    }

    /// Handle a JSON request (`{"action": "ping" | "analyze" | "clear"}`)
    /// and return the JSON response
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, request_json: &str) -> Result<String, JsValue> {
        let mut dom = page()?;
        let root = dom.root();
        Ok(self.script.handle_json(&mut dom, &root, request_json))
    }

    /// Same as `handleMessage`, taking and returning plain objects
    #[wasm_bindgen(js_name = handleMessageObject)]
    pub fn handle_message_object(&self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: serde_json::Value = serde_wasm_bindgen::from_value(request)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse request: {}", e)))?;
        let mut dom = page()?;
        let root = dom.root();
        let response = self.script.handle(&mut dom, &root, &request.to_string());
        to_js(&response)
    }

    #[wasm_bindgen(js_name = analyze)]
    pub fn analyze(&self) -> Result<String, JsValue> {
        self.handle_message(r#"{"action":"analyze"}"#)
    }

    #[wasm_bindgen(js_name = clear)]
    pub fn clear(&self) -> Result<String, JsValue> {
        self.handle_message(r#"{"action":"clear"}"#)
    }
}

/// Scan a string without touching the page
#[wasm_bindgen(js_name = scanText)]
pub fn scan_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&style_engine::scan(text))
}

/// List pages known to the review service
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = fetchPages)]
pub async fn fetch_pages_wasm(api_base: Option<String>) -> Result<JsValue, JsValue> {
    let config = api_base.map(RemoteConfig::new).unwrap_or_default();
    let listing = remote_call(remote::fetch_pages(&config)).await?;
    to_js(&listing)
}

/// Ask the review service to process one page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = processPage)]
pub async fn process_page_wasm(
    page_id: String,
    options: JsValue,
    api_base: Option<String>,
) -> Result<JsValue, JsValue> {
    let options: shared_types::ProcessOptions = if options.is_undefined() || options.is_null() {
        shared_types::ProcessOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse options: {}", e)))?
    };
    let config = api_base.map(RemoteConfig::new).unwrap_or_default();
    let result = remote_call(remote::process_page(&config, &page_id, &options)).await?;
    to_js(&result)
}

#[cfg(target_arch = "wasm32")]
async fn remote_call<T>(
    call: impl std::future::Future<Output = anyhow::Result<T>>,
) -> Result<T, JsValue> {
    call.await.map_err(|e| {
        tracing::error!(error = %format!("{:#}", e), "remote call failed");
        JsValue::from_str(&format!("{:#}", e))
    })
}
