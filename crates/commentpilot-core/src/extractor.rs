//! Context extraction.

use tracing::debug;

use commentpilot_config::PageConfig;
use commentpilot_protocols::{NodeId, PageDom, Selector};

/// Finds the text a comment box is replying to.
#[derive(Debug, Clone)]
pub struct ContextExtractor {
    article_selector: Selector,
    content_selectors: Vec<Selector>,
    fallback: String,
}

impl ContextExtractor {
    pub fn new(
        article_selector: Selector,
        content_selectors: Vec<Selector>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            article_selector,
            content_selectors,
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(
            config.article_selector.clone(),
            config.content_selectors.clone(),
            config.fallback_context.clone(),
        )
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Context for `target`. Never fails: anything missing yields the
    /// fallback seed.
    pub fn extract_context<D: PageDom + ?Sized>(&self, dom: &D, target: NodeId) -> String {
        let Some(article) = dom.closest(target, &self.article_selector) else {
            debug!("Context extraction: no article around {}, using fallback", target);
            return self.fallback.clone();
        };

        for selector in &self.content_selectors {
            for node in dom.query_within(article, selector) {
                let text = dom.text_content(node);
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }

        debug!("Context extraction: {} has no content text, using fallback", article);
        self.fallback.clone()
    }
}
