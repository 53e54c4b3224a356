//! Recurring auto-like.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use commentpilot_protocols::{PageDom, Selector, Settings};

use crate::controller::{is_marked, LIKE_MARKER};

/// Clicks every visible, not yet clicked like element while `auto_love` is on.
pub struct AutoActionTimer<D: PageDom> {
    page: Arc<Mutex<D>>,
    like_selector: Selector,
    settings: watch::Receiver<Settings>,
    interval: Duration,
}

impl<D: PageDom> AutoActionTimer<D> {
    pub fn new(
        page: Arc<Mutex<D>>,
        like_selector: Selector,
        settings: watch::Receiver<Settings>,
        interval: Duration,
    ) -> Self {
        Self {
            page,
            like_selector,
            settings,
            interval,
        }
    }

    /// One pass. Returns how many elements were clicked.
    pub fn tick(&self) -> usize {
        if !self.settings.borrow().auto_love {
            return 0;
        }

        let mut page = self.page.lock();
        let mut acted = 0;
        for like in page.query_all(&self.like_selector) {
            if is_marked(&*page, like, LIKE_MARKER) || !page.is_rendered(like) {
                continue;
            }
            if let Err(e) = page.click(like) {
                warn!("Auto-like click failed for {}: {}", like, e);
                continue;
            }
            if let Err(e) = page.set_attribute(like, LIKE_MARKER, "true") {
                warn!("Auto-like marker not set on {}: {}", like, e);
                continue;
            }
            acted += 1;
        }

        if acted > 0 {
            debug!("Auto-like tick: {} element(s) liked", acted);
        }
        acted
    }

    /// Tick every interval until cancelled.
    pub async fn run(self: Arc<Self>, cancel: watch::Receiver<bool>) {
        info!("Auto-like timer started (interval: {:?})", self.interval);

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel = cancel;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                }
                _ = cancel.changed() => {
                    info!("Auto-like timer shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{feed_page, FeedPage};
    use commentpilot_page::Document;

    type Parts = (
        Arc<AutoActionTimer<Document>>,
        Arc<Mutex<Document>>,
        watch::Sender<Settings>,
    );

    fn timer(doc: Document, auto_love: bool) -> Parts {
        let page = Arc::new(Mutex::new(doc));
        let (tx, rx) = watch::channel(Settings {
            auto_love,
            ..Settings::default()
        });
        let timer = Arc::new(AutoActionTimer::new(
            Arc::clone(&page),
            Selector::attr_eq("aria-label", "Like"),
            rx,
            Duration::from_millis(2000),
        ));
        (timer, page, tx)
    }

    #[test]
    fn test_tick_acts_once_per_element() {
        let FeedPage { doc, like, .. } = feed_page();
        let (timer, page, _tx) = timer(doc, true);

        assert_eq!(timer.tick(), 1);
        assert_eq!(page.lock().attribute(like, LIKE_MARKER).as_deref(), Some("true"));

        assert_eq!(timer.tick(), 0);
        assert_eq!(page.lock().page_clicks(), &[like]);
    }

    #[test]
    fn test_tick_disabled() {
        let FeedPage { doc, .. } = feed_page();
        let (timer, page, _tx) = timer(doc, false);

        assert_eq!(timer.tick(), 0);
        assert!(page.lock().page_clicks().is_empty());
    }

    #[test]
    fn test_tick_rereads_setting() {
        let FeedPage { doc, .. } = feed_page();
        let (timer, _page, tx) = timer(doc, false);

        assert_eq!(timer.tick(), 0);
        tx.send_modify(|s| s.auto_love = true);
        assert_eq!(timer.tick(), 1);
    }

    #[test]
    fn test_tick_skips_hidden_and_detached() {
        let FeedPage {
            mut doc, article, ..
        } = feed_page();
        let hidden = doc
            .append(article, "div", &[("aria-label", "Like"), ("hidden", "")])
            .unwrap();
        let orphan = doc.create_element("div");
        doc.set_attribute(orphan, "aria-label", "Like").unwrap();
        let (timer, page, _tx) = timer(doc, true);

        assert_eq!(timer.tick(), 1);
        let page = page.lock();
        assert!(page.attribute(hidden, LIKE_MARKER).is_none());
        assert!(page.attribute(orphan, LIKE_MARKER).is_none());
    }

    #[test]
    fn test_failed_click_does_not_stop_tick() {
        let FeedPage {
            mut doc,
            article,
            like,
            ..
        } = feed_page();
        let disabled = doc
            .append(article, "div", &[("aria-label", "Like"), ("disabled", "")])
            .unwrap();
        let (timer, page, _tx) = timer(doc, true);

        assert_eq!(timer.tick(), 1);
        let page = page.lock();
        assert_eq!(page.page_clicks(), &[like]);
        assert!(page.attribute(disabled, LIKE_MARKER).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval() {
        let FeedPage { mut doc, article, .. } = feed_page();
        doc.append(article, "div", &[("aria-label", "Share")]).unwrap();
        let (timer, page, _tx) = timer(doc, true);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(Arc::clone(&timer).run(cancel_rx));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(page.lock().page_clicks().len(), 1);

        let late = {
            let mut page = page.lock();
            page.append(article, "div", &[("aria-label", "Like")]).unwrap()
        };
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(page.lock().attribute(late, LIKE_MARKER).is_none());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(page.lock().attribute(late, LIKE_MARKER).as_deref(), Some("true"));

        cancel_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
