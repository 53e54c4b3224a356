//! Hand-written stubs shared by the engine tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use commentpilot_page::Document;
use commentpilot_protocols::{
    GenerationError, NodeId, StatusKind, StatusReport, StatusSink, TextGenerator,
};

/// Generator returning a canned answer, optionally waiting for a release.
pub struct StubGenerator {
    response: Mutex<Result<String, u16>>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<(String, String)>>,
    gate: Option<Arc<Notify>>,
}

impl StubGenerator {
    pub fn ok(text: &str) -> Self {
        Self {
            response: Mutex::new(Ok(text.to_string())),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            response: Mutex::new(Err(status)),
            ..Self::ok("")
        }
    }

    /// Block every call until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn id(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .push((prompt.to_string(), api_key.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &*self.response.lock() {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(GenerationError::RequestFailed {
                status: *status,
                message: "stub failure".to_string(),
            }),
        }
    }
}

/// Status sink keeping every report.
#[derive(Default)]
pub struct RecordingStatusSink {
    reports: Mutex<Vec<StatusReport>>,
}

impl RecordingStatusSink {
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports.lock().clone()
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.reports.lock().iter().filter(|r| r.status == kind).count()
    }
}

impl StatusSink for RecordingStatusSink {
    fn report(&self, report: StatusReport) {
        self.reports.lock().push(report);
    }
}

/// Nodes of [`feed_page`].
pub struct FeedPage {
    pub doc: Document,
    pub article: NodeId,
    pub form: NodeId,
    pub input: NodeId,
    pub like: NodeId,
}

/// One post with a message, a like button and a comment box inside a form.
pub fn feed_page() -> FeedPage {
    let mut doc = Document::new("https://www.facebook.com/");
    let body = doc.body();
    let article = doc.append(body, "div", &[("role", "article")]).unwrap();
    doc.append_with_text(article, "div", &[("data-ad-preview", "message")], "Great day!")
        .unwrap();
    let like = doc.append(article, "div", &[("aria-label", "Like")]).unwrap();
    let form = doc.append(article, "form", &[]).unwrap();
    let input = doc
        .append(form, "div", &[("contenteditable", "true"), ("role", "textbox")])
        .unwrap();
    FeedPage {
        doc,
        article,
        form,
        input,
        like,
    }
}
