//! Host page protocol definitions.
//!
//! The host page is owned by someone else: nodes appear and disappear as the
//! page re-renders. Everything here is expressed through opaque [`NodeId`]
//! handles so that implementations can back them with a live browser DOM or
//! with the in-memory document used in tests.
//!
//! ## Core Concepts
//!
//! - **Selector**: a typed structural predicate over an element
//! - **PageEvent**: what the page tells its observers (mutations, navigation,
//!   intercepted control activations)
//! - **PageDom**: the operations the assistant needs from a page

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::DomError;

mod selector;

pub use selector::{ElementLike, Selector};

/// Opaque handle to a node in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Event delivered to page subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// One batch of nodes inserted somewhere in the document.
    Mutation { added: Vec<NodeId> },
    /// The URL changed without a full reload.
    Navigated { url: String },
    /// A bound control was activated. The click never reached the page's own
    /// handlers.
    ControlActivated { control: NodeId, target: NodeId },
}

/// Operations the assistant performs on a host page.
pub trait PageDom: Send + 'static {
    /// Current page URL.
    fn url(&self) -> &str;

    /// All connected elements matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn query_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId>;

    /// Whether `node` itself matches `selector`.
    fn matches(&self, node: NodeId, selector: &Selector) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Concatenated text of `node` and its descendants.
    fn text_content(&self, node: NodeId) -> String;

    /// Replace the content of `node` with a single text run.
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Whether `node` is reachable from the document root.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Whether `node` and its ancestors are rendered (not hidden).
    fn is_rendered(&self, node: NodeId) -> bool;

    /// Fire the page's native input notification on an editable node.
    fn dispatch_input(&mut self, node: NodeId) -> Result<(), DomError>;

    /// Click `node`. Clicks on bound controls are intercepted and surface as
    /// [`PageEvent::ControlActivated`] instead of reaching the page.
    fn click(&mut self, node: NodeId) -> Result<(), DomError>;

    /// Bind `control` so that activating it emits a `ControlActivated` event
    /// carrying `target`. The binding lives on the control node and dies with it.
    fn bind_activation(&mut self, control: NodeId, target: NodeId) -> Result<(), DomError>;

    /// Subscribe to page events.
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PageEvent>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.matches(candidate, selector) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// Whether `node` is, or contains, an element matching `selector`.
    fn contains_match(&self, node: NodeId, selector: &Selector) -> bool {
        self.matches(node, selector) || !self.query_within(node, selector).is_empty()
    }
}
