//! Live settings snapshot.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use commentpilot_protocols::{Settings, SettingsError, SettingsStore};

/// Settings snapshot that follows the store's change notifications.
///
/// Components hold a [`watch::Receiver`] and read it at the moment they
/// need a value, so a key saved in the settings UI is picked up by the next
/// activation without restarting anything.
pub struct LiveSettings {
    rx: watch::Receiver<Settings>,
}

impl LiveSettings {
    /// Read the store and spawn the task that applies its changes.
    ///
    /// The subscription is taken before the initial read so that no change
    /// falls between the two.
    pub async fn spawn(
        store: Arc<dyn SettingsStore>,
        cancel: watch::Receiver<bool>,
    ) -> Result<(Self, JoinHandle<()>), SettingsError> {
        let mut changes = store.subscribe();
        let initial = store.get_all().await?;
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut cancel = cancel;
            loop {
                tokio::select! {
                    _ = cancel.changed() => break,
                    change = changes.recv() => match change {
                        Ok(change) => {
                            let key = change.key;
                            tx.send_if_modified(|settings| settings.apply(&change));
                            debug!("Live settings: {} updated", key.as_str());
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!("Live settings missed {} change(s), reloading", missed);
                            match store.get_all().await {
                                Ok(settings) => {
                                    tx.send_replace(settings);
                                }
                                Err(e) => warn!("Live settings reload failed: {}", e),
                            }
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            info!("Live settings stopped");
        });

        Ok((Self { rx }, handle))
    }

    /// Fixed snapshot, for callers without a store.
    pub fn fixed(settings: Settings) -> Self {
        let (_tx, rx) = watch::channel(settings);
        Self { rx }
    }

    pub fn receiver(&self) -> watch::Receiver<Settings> {
        self.rx.clone()
    }

    pub fn current(&self) -> Settings {
        self.rx.borrow().clone()
    }
}
