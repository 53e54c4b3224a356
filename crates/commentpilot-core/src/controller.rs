//! Comment box augmentation and the generate-and-insert flow.
//!
//! Each eligible comment box gets exactly one control. Whether a box is
//! already augmented is recorded on the page itself (a data attribute on the
//! target), as is each control's visual state, so that nothing here has to
//! track page nodes that the page may destroy at any time.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use commentpilot_config::PageConfig;
use commentpilot_protocols::{
    NodeId, PageDom, Selector, Settings, StatusReport, StatusSink, TextGenerator,
};

use crate::error::{ActivationError, InsertionError};
use crate::extractor::ContextExtractor;
use crate::prompt::build_prompt;
use crate::watcher::WatchEvent;

/// Set to `"true"` on a target once its control is inserted.
pub const TARGET_MARKER: &str = "data-ai-button-added";
/// Holds a control's [`ControlState`].
pub const CONTROL_STATE_ATTR: &str = "data-ai-state";
/// Set to `"true"` on a like element once it has been clicked for the user.
pub const LIKE_MARKER: &str = "data-auto-loved";

const CONTROL_CLASS: &str = "ai-comment-button";
const CONTROL_LABEL: &str = "AI Comment";

/// Visual state of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Idle,
    Busy,
    Success,
    Error,
}

impl ControlState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// State stored on `control`. Missing or unknown values read as idle.
    pub fn of<D: PageDom + ?Sized>(dom: &D, control: NodeId) -> Self {
        match dom.attribute(control, CONTROL_STATE_ATTR).as_deref() {
            Some("busy") => Self::Busy,
            Some("success") => Self::Success,
            Some("error") => Self::Error,
            _ => Self::Idle,
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted={} skipped={} failed={}",
            self.inserted, self.skipped, self.failed
        )
    }
}

/// Result of one activation.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// The control was already busy.
    Ignored,
    Inserted,
    Failed(ActivationError),
}

/// Selector matching the controls this crate inserts.
pub fn control_selector() -> Selector {
    Selector::class(CONTROL_CLASS)
}

pub(crate) fn is_marked<D: PageDom + ?Sized>(dom: &D, node: NodeId, marker: &str) -> bool {
    dom.attribute(node, marker).as_deref() == Some("true")
}

/// Where to insert the control for `target`.
///
/// The first anchor selector matching an ancestor wins; otherwise the
/// target's parent.
pub fn resolve_anchor<D: PageDom + ?Sized>(
    dom: &D,
    target: NodeId,
    anchors: &[Selector],
) -> Option<NodeId> {
    let parent = dom.parent(target)?;
    anchors
        .iter()
        .find_map(|selector| dom.closest(parent, selector))
        .or(Some(parent))
}

/// Injection controller for one page.
pub struct InjectionController<D: PageDom> {
    page: Arc<Mutex<D>>,
    target_selector: Selector,
    anchor_selectors: Vec<Selector>,
    article_selector: Selector,
    like_selector: Selector,
    extractor: ContextExtractor,
    generator: Arc<dyn TextGenerator>,
    status: Arc<dyn StatusSink>,
    settings: watch::Receiver<Settings>,
}

impl<D: PageDom> InjectionController<D> {
    pub fn new(
        page: Arc<Mutex<D>>,
        config: &PageConfig,
        generator: Arc<dyn TextGenerator>,
        status: Arc<dyn StatusSink>,
        settings: watch::Receiver<Settings>,
    ) -> Self {
        Self {
            page,
            target_selector: config.target_selector(),
            anchor_selectors: config.anchor_selectors.clone(),
            article_selector: config.article_selector.clone(),
            like_selector: config.like_selector.clone(),
            extractor: ContextExtractor::from_config(config),
            generator,
            status,
            settings,
        }
    }

    /// Add a control to every eligible target that does not have one.
    pub fn scan(&self) -> ScanReport {
        let mut page = self.page.lock();
        let mut report = ScanReport::default();

        for target in page.query_all(&self.target_selector) {
            if is_marked(&*page, target, TARGET_MARKER) {
                report.skipped += 1;
                continue;
            }
            match self.insert_control(&mut *page, target) {
                Ok(control) => {
                    debug!("Injection scan: control {} added for {}", control, target);
                    report.inserted += 1;
                }
                Err(e) => {
                    debug!("Injection scan: {}", e);
                    report.failed += 1;
                }
            }
        }

        debug!("Injection scan finished: {}", report);
        report
    }

    fn insert_control(&self, page: &mut D, target: NodeId) -> Result<NodeId, InsertionError> {
        let anchor = resolve_anchor(&*page, target, &self.anchor_selectors)
            .ok_or(InsertionError::NoAnchor(target))?;

        let control = page.create_element("div");
        page.set_attribute(control, "class", CONTROL_CLASS)?;
        page.set_attribute(control, "role", "button")?;
        page.set_attribute(control, CONTROL_STATE_ATTR, ControlState::Idle.as_str())?;
        page.set_text_content(control, CONTROL_LABEL)?;
        page.bind_activation(control, target)?;
        page.append_child(anchor, control)?;
        page.set_attribute(target, TARGET_MARKER, "true")?;
        Ok(control)
    }

    /// Handle a click on `control`, writing a generated comment into `target`.
    ///
    /// Every failure is reported to the status sink here, once, and the
    /// control always ends up idle.
    pub async fn on_activate(&self, control: NodeId, target: NodeId) -> ActivationOutcome {
        if !self.try_begin(control) {
            debug!("Activation ignored: {} is busy", control);
            return ActivationOutcome::Ignored;
        }

        match self.generate_and_insert(target).await {
            Ok(()) => {
                self.set_state(control, ControlState::Success);
                self.status
                    .report(StatusReport::success("Comment generated successfully"));
                if self.settings.borrow().auto_love {
                    self.like_enclosing(target);
                }
                self.set_state(control, ControlState::Idle);
                ActivationOutcome::Inserted
            }
            Err(e) => {
                warn!("Comment generation failed for {}: {}", target, e);
                self.set_state(control, ControlState::Error);
                self.status.report(StatusReport::error(e.user_message()));
                self.set_state(control, ControlState::Idle);
                ActivationOutcome::Failed(e)
            }
        }
    }

    /// Check-and-set Busy under one lock.
    fn try_begin(&self, control: NodeId) -> bool {
        let mut page = self.page.lock();
        if ControlState::of(&*page, control) == ControlState::Busy {
            return false;
        }
        page.set_attribute(control, CONTROL_STATE_ATTR, ControlState::Busy.as_str())
            .is_ok()
    }

    fn set_state(&self, control: NodeId, state: ControlState) {
        if let Err(e) = self
            .page
            .lock()
            .set_attribute(control, CONTROL_STATE_ATTR, state.as_str())
        {
            debug!("Control {} state not updated: {}", control, e);
        }
    }

    async fn generate_and_insert(&self, target: NodeId) -> Result<(), ActivationError> {
        let settings = self.settings.borrow().clone();
        if !settings.has_api_key() {
            return Err(ActivationError::MissingApiKey);
        }

        let prompt = {
            let page = self.page.lock();
            let context = self.extractor.extract_context(&*page, target);
            build_prompt(&context, settings.language_style)
        };

        let text = self.generator.generate(&prompt, &settings.api_key).await?;

        let mut page = self.page.lock();
        if !page.is_connected(target) {
            debug!("Generated comment dropped: {} left the page", target);
            return Ok(());
        }
        page.set_text_content(target, &text)?;
        page.dispatch_input(target)?;
        Ok(())
    }

    fn like_enclosing(&self, target: NodeId) {
        let mut page = self.page.lock();
        let Some(article) = page.closest(target, &self.article_selector) else {
            return;
        };
        let Some(like) = page
            .query_within(article, &self.like_selector)
            .into_iter()
            .next()
        else {
            return;
        };
        if is_marked(&*page, like, LIKE_MARKER) {
            return;
        }

        match page.click(like) {
            Ok(()) => {
                if let Err(e) = page.set_attribute(like, LIKE_MARKER, "true") {
                    warn!("Auto-like marker not set on {}: {}", like, e);
                }
            }
            Err(e) => warn!("Auto-like failed for {}: {}", like, e),
        }
    }

    /// Drain watcher events until cancelled or the watcher goes away.
    ///
    /// Scans run inline; activations run as their own tasks so that a slow
    /// generation never holds up scanning or other controls.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<WatchEvent>,
        mut cancel: watch::Receiver<bool>,
    ) {
        info!("Injection controller started");

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    info!("Injection controller shutting down");
                    break;
                }
                event = events.recv() => match event {
                    Some(WatchEvent::TargetsMightHaveChanged(reason)) => {
                        let report = self.scan();
                        debug!("Rescan after {:?}: {}", reason, report);
                    }
                    Some(WatchEvent::ControlActivated { control, target }) => {
                        let controller = Arc::clone(&self);
                        tokio::spawn(async move {
                            controller.on_activate(control, target).await;
                        });
                    }
                    None => {
                        debug!("Injection controller: event queue closed");
                        break;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
