//! One augmented page.
//!
//! A session wires the engine to a page: live settings, the change watcher,
//! the controller's run loop and the auto-like timer, plus the initial
//! page-load scan. All background tasks stop together on [`Session::shutdown`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

use commentpilot_config::Config;
use commentpilot_protocols::{PageDom, SettingsStore, StatusSink, TextGenerator};

use crate::auto_action::AutoActionTimer;
use crate::controller::{InjectionController, ScanReport};
use crate::error::SessionError;
use crate::settings::LiveSettings;
use crate::watcher::{ChangeWatcher, ScanRequester};

const WATCH_QUEUE_CAPACITY: usize = 64;

/// Whether `url` is on one of `allowed_hosts` or a subdomain of one.
/// An empty list allows every host.
pub fn host_allowed(url: &str, allowed_hosts: &[String]) -> Result<bool, SessionError> {
    if allowed_hosts.is_empty() {
        return Ok(true);
    }

    let parsed = Url::parse(url).map_err(|e| SessionError::InvalidUrl(format!("{}: {}", url, e)))?;
    let Some(host) = parsed.host_str() else {
        return Ok(false);
    };
    let host = host.to_ascii_lowercase();

    Ok(allowed_hosts.iter().any(|allowed| {
        let allowed = allowed.trim().trim_start_matches('.').to_ascii_lowercase();
        host == allowed || host.ends_with(&format!(".{}", allowed))
    }))
}

/// Running assistant on one page.
pub struct Session<D: PageDom> {
    page: Arc<Mutex<D>>,
    controller: Arc<InjectionController<D>>,
    requester: ScanRequester,
    settings: LiveSettings,
    initial_scan: ScanReport,
    cancel: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl<D: PageDom> Session<D> {
    /// Start augmenting `page`.
    ///
    /// Fails without side effects when the page's host is not enabled.
    pub async fn start(
        page: Arc<Mutex<D>>,
        config: &Config,
        store: Arc<dyn SettingsStore>,
        generator: Arc<dyn TextGenerator>,
        status: Arc<dyn StatusSink>,
    ) -> Result<Self, SessionError> {
        let url = page.lock().url().to_string();
        if !host_allowed(&url, &config.page.allowed_hosts)? {
            return Err(SessionError::HostNotAllowed(url));
        }

        let (cancel, cancel_rx) = watch::channel(false);
        let (settings, settings_task) = LiveSettings::spawn(store, cancel_rx.clone()).await?;

        let events = page.lock().subscribe();
        let (queue_tx, queue_rx) = mpsc::channel(WATCH_QUEUE_CAPACITY);

        let controller = Arc::new(InjectionController::new(
            Arc::clone(&page),
            &config.page,
            generator,
            status,
            settings.receiver(),
        ));
        let watcher = ChangeWatcher::new(
            Arc::clone(&page),
            config.page.target_selector(),
            Duration::from_millis(config.watcher.debounce_ms),
            queue_tx,
        );
        let requester = watcher.requester();
        let timer = Arc::new(AutoActionTimer::new(
            Arc::clone(&page),
            config.page.like_selector.clone(),
            settings.receiver(),
            Duration::from_millis(config.auto_action.interval_ms.max(1)),
        ));

        let initial_scan = controller.scan();
        info!("Session started on {}: {}", url, initial_scan);

        let tasks = vec![
            settings_task,
            tokio::spawn(watcher.run(events, cancel_rx.clone())),
            tokio::spawn(Arc::clone(&controller).run(queue_rx, cancel_rx.clone())),
            tokio::spawn(timer.run(cancel_rx)),
        ];

        Ok(Self {
            page,
            controller,
            requester,
            settings,
            initial_scan,
            cancel,
            tasks,
        })
    }

    pub fn page(&self) -> &Arc<Mutex<D>> {
        &self.page
    }

    pub fn controller(&self) -> &Arc<InjectionController<D>> {
        &self.controller
    }

    pub fn settings(&self) -> &LiveSettings {
        &self.settings
    }

    /// Result of the page-load scan.
    pub fn initial_scan(&self) -> ScanReport {
        self.initial_scan
    }

    /// Ask for a scan now, bypassing the debounce.
    pub fn request_scan(&self) -> bool {
        self.requester.request_scan()
    }

    /// Stop every background task and wait for them.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }
        info!("Session stopped");
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
