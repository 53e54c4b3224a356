//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use commentpilot_protocols::{Selector, Settings};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Initial user settings (key, tone, auto-like).
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub watcher: WatcherConfig,

    #[serde(default)]
    pub auto_action: AutoActionConfig,
}

/// Text-generation service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Host page heuristics.
///
/// The host page's markup is not under our control, so every structural
/// lookup is a configurable, ordered selector list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Hosts the assistant augments (suffix match). Empty allows every host.
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// Editable comment boxes.
    #[serde(default = "default_target_selectors")]
    pub target_selectors: Vec<Selector>,

    /// Ancestors to insert the control into, tried in order before falling
    /// back to the target's parent.
    #[serde(default = "default_anchor_selectors")]
    pub anchor_selectors: Vec<Selector>,

    /// Post or comment container.
    #[serde(default = "default_article_selector")]
    pub article_selector: Selector,

    /// Where the post text lives inside the container, in priority order.
    #[serde(default = "default_content_selectors")]
    pub content_selectors: Vec<Selector>,

    /// Affirmative action ("like") buttons.
    #[serde(default = "default_like_selector")]
    pub like_selector: Selector,

    /// Prompt seed used when no context can be found.
    #[serde(default = "default_fallback_context")]
    pub fallback_context: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            target_selectors: default_target_selectors(),
            anchor_selectors: default_anchor_selectors(),
            article_selector: default_article_selector(),
            content_selectors: default_content_selectors(),
            like_selector: default_like_selector(),
            fallback_context: default_fallback_context(),
        }
    }
}

impl PageConfig {
    /// All target selectors folded into one selector list.
    pub fn target_selector(&self) -> Selector {
        match self.target_selectors.as_slice() {
            [single] => single.clone(),
            many => Selector::AnyOf(many.to_vec()),
        }
    }
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["facebook.com".to_string()]
}

fn default_target_selectors() -> Vec<Selector> {
    vec![Selector::attr_eq("contenteditable", "true").and(Selector::attr_eq("role", "textbox"))]
}

fn default_anchor_selectors() -> Vec<Selector> {
    vec![
        Selector::tag("form"),
        Selector::attr_eq("data-visualcompletion", "ignore-dynamic"),
    ]
}

fn default_article_selector() -> Selector {
    Selector::attr_eq("role", "article")
}

fn default_content_selectors() -> Vec<Selector> {
    vec![
        Selector::attr_eq("data-ad-preview", "message"),
        Selector::attr_eq("data-ad-comet-preview", "message"),
        Selector::tag("div").and(Selector::attr_eq("dir", "auto")),
    ]
}

fn default_like_selector() -> Selector {
    Selector::attr_eq("aria-label", "Like")
}

fn default_fallback_context() -> String {
    "write a general friendly comment".to_string()
}

/// Change watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Delay between the first relevant mutation and the rescan.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

/// Auto-like timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoActionConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for AutoActionConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
