//! Request boundary of the content script
//!
//! Every request, well-formed or not, gets a response; nothing escapes as a
//! panic or a thrown value.

use crate::pipeline::Pipeline;
use page_dom::Dom;
use shared_types::{Request, Response};

#[derive(Debug, Clone, Default)]
pub struct ContentScript {
    pipeline: Pipeline,
}

impl ContentScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Handle one JSON request against the page rooted at `root`
    pub fn handle<D: Dom>(&self, dom: &mut D, root: &D::Node, request_json: &str) -> Response {
        let request = match Request::parse(request_json) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "rejected request");
                return Response::failure(e.to_string());
            }
        };
        tracing::debug!(?request, "handling request");

        match request {
            Request::Ping => Response::loaded(),
            Request::Analyze => {
                let report = self.pipeline.analyze(dom, root, now_millis());
                Response::analyzed(report.summary)
            }
            Request::Clear => {
                let cleared = self.pipeline.clear(dom, root);
                tracing::debug!(cleared, "cleared highlights");
                Response::ack()
            }
        }
    }

    /// Same as [`handle`](Self::handle), serialized for the message channel
    pub fn handle_json<D: Dom>(&self, dom: &mut D, root: &D::Node, request_json: &str) -> String {
        self.handle(dom, root, request_json).to_json()
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
