//! Element node stored in a [`Document`](crate::Document) arena.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use commentpilot_protocols::{ElementLike, NodeId};

/// Element node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Tag name (lowercase).
    pub tag_name: String,

    /// Attributes, including `class` and `id`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Text owned directly by this element (not by its children).
    #[serde(default)]
    pub text: String,

    /// Parent node ID.
    pub parent: Option<NodeId>,

    /// Child node IDs, in document order.
    #[serde(default)]
    pub children: Vec<NodeId>,

    /// Target bound to this element when it is an injected control.
    #[serde(skip)]
    pub(crate) activation: Option<NodeId>,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            activation: None,
        }
    }

    /// Whether the element hides itself from rendering.
    pub fn is_hidden(&self) -> bool {
        self.attributes.contains_key("hidden")
            || self.attributes.get("aria-hidden").is_some_and(|v| v == "true")
            || self
                .attributes
                .get("style")
                .is_some_and(|style| style.replace(' ', "").contains("display:none"))
    }

    /// Whether clicking this element is intercepted.
    pub fn is_bound(&self) -> bool {
        self.activation.is_some()
    }
}

impl ElementLike for Element {
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
