//! Page change watching.
//!
//! The host page renders comment boxes lazily and swaps content on
//! navigation without reloading. The watcher turns that stream of page
//! events into scan requests for the controller: relevant mutation batches
//! are debounced, navigation and manual requests go through immediately.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use commentpilot_protocols::{NodeId, PageDom, PageEvent, Selector};

/// Why a scan was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchReason {
    PageLoad,
    Mutation,
    Navigation,
    Manual,
}

/// Work for the controller's run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    TargetsMightHaveChanged(WatchReason),
    ControlActivated { control: NodeId, target: NodeId },
}

/// Debounce policy for mutation-triggered scans.
///
/// The first relevant mutation arms a deadline; later ones before it fires
/// join the same scan without pushing it back, so a page that never stops
/// mutating still gets scanned.
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ScanDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record a relevant mutation observed at `now`.
    pub fn on_mutation(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
        }
    }

    /// Navigation scans right away, so any pending deadline is dropped.
    pub fn on_navigation(&mut self) {
        self.deadline = None;
    }

    /// Whether the scan is due at `now`. Disarms when it is.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Handle for requesting an immediate scan from outside the page.
#[derive(Debug, Clone)]
pub struct ScanRequester {
    output: mpsc::Sender<WatchEvent>,
}

impl ScanRequester {
    /// Returns `false` when the controller is gone or its queue is full.
    pub fn request_scan(&self) -> bool {
        self.output
            .try_send(WatchEvent::TargetsMightHaveChanged(WatchReason::Manual))
            .is_ok()
    }
}

/// Watches one page and feeds the controller.
pub struct ChangeWatcher<D: PageDom> {
    page: Arc<Mutex<D>>,
    target_selector: Selector,
    debouncer: ScanDebouncer,
    output: mpsc::Sender<WatchEvent>,
}

impl<D: PageDom> ChangeWatcher<D> {
    pub fn new(
        page: Arc<Mutex<D>>,
        target_selector: Selector,
        debounce: Duration,
        output: mpsc::Sender<WatchEvent>,
    ) -> Self {
        Self {
            page,
            target_selector,
            debouncer: ScanDebouncer::new(debounce),
            output,
        }
    }

    pub fn requester(&self) -> ScanRequester {
        ScanRequester {
            output: self.output.clone(),
        }
    }

    /// Whether any added node is, or contains, an eligible target.
    fn is_relevant(&self, added: &[NodeId]) -> bool {
        let page = self.page.lock();
        added
            .iter()
            .any(|node| page.contains_match(*node, &self.target_selector))
    }

    /// Process page events until cancelled, the page stops publishing, or
    /// the controller goes away.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<PageEvent>,
        mut cancel: watch::Receiver<bool>,
    ) {
        info!("Change watcher started");

        loop {
            let deadline = self.debouncer.deadline();
            let outgoing = tokio::select! {
                _ = cancel.changed() => {
                    info!("Change watcher shutting down");
                    break;
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.debouncer.poll(Instant::now()) {
                        Some(WatchEvent::TargetsMightHaveChanged(WatchReason::Mutation))
                    } else {
                        None
                    }
                }
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => {
                        debug!("Change watcher: page event stream closed");
                        break;
                    }
                },
            };

            if let Some(outgoing) = outgoing {
                if self.output.send(outgoing).await.is_err() {
                    warn!("Change watcher: controller queue closed");
                    break;
                }
            }
        }
    }

    fn handle(&mut self, event: PageEvent) -> Option<WatchEvent> {
        match event {
            PageEvent::Mutation { added } => {
                if self.is_relevant(&added) {
                    self.debouncer.on_mutation(Instant::now());
                }
                None
            }
            PageEvent::Navigated { url } => {
                debug!("Change watcher: navigated to {}", url);
                self.debouncer.on_navigation();
                Some(WatchEvent::TargetsMightHaveChanged(WatchReason::Navigation))
            }
            PageEvent::ControlActivated { control, target } => {
                Some(WatchEvent::ControlActivated { control, target })
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
