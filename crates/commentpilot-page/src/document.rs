//! Arena-backed document implementing [`PageDom`].

use tokio::sync::mpsc;
use tracing::debug;

use commentpilot_protocols::{DomError, NodeId, PageDom, PageEvent, Selector};

use crate::element::Element;

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

/// In-memory host page.
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
    url: String,
    subscribers: Vec<mpsc::UnboundedSender<PageEvent>>,
    /// Nodes that received a native input notification, in order.
    input_log: Vec<NodeId>,
    /// Clicks the page's own handlers received, in order.
    click_log: Vec<NodeId>,
}

impl Document {
    /// Create an empty page at `url` with a `body` root.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            nodes: vec![Element::new("body")],
            body: NodeId(0),
            url: url.into(),
            subscribers: Vec::new(),
            input_log: Vec::new(),
            click_log: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode(node))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value)?;
        }
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Like [`Document::append`], with direct text content.
    pub fn append_with_text(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<NodeId, DomError> {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value)?;
        }
        self.element_mut(node)?.text = text.to_string();
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Detach `node` from its parent, as a page re-render would.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        let parent = self.element_mut(node)?.parent.take();
        if let Some(parent) = parent {
            self.element_mut(parent)?.children.retain(|c| *c != node);
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.element_mut(node)?.attributes.remove(name);
        Ok(())
    }

    /// Change the URL without reloading, as a single-page app does.
    pub fn navigate(&mut self, url: impl Into<String>) {
        let url = url.into();
        if url == self.url {
            return;
        }
        debug!("Document navigated: {} -> {}", self.url, url);
        self.url = url.clone();
        self.emit(PageEvent::Navigated { url });
    }

    /// Deliver a batch of added nodes to subscribers in one notification.
    pub fn notify_added(&mut self, added: Vec<NodeId>) {
        if !added.is_empty() {
            self.emit(PageEvent::Mutation { added });
        }
    }

    pub fn input_events(&self) -> &[NodeId] {
        &self.input_log
    }

    pub fn page_clicks(&self) -> &[NodeId] {
        &self.click_log
    }

    fn emit(&mut self, event: PageEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.nodes.get(candidate.0).and_then(|e| e.parent);
        }
        false
    }

    fn collect_descendants(&self, scope: NodeId, selector: &Selector, out: &mut Vec<NodeId>) {
        let Some(element) = self.element(scope) else {
            return;
        };
        for child in &element.children {
            if self.matches(*child, selector) {
                out.push(*child);
            }
            self.collect_descendants(*child, selector, out);
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(element) = self.element(node) else {
            return;
        };
        out.push_str(&element.text);
        for child in &element.children {
            self.collect_text(*child, out);
        }
    }
}

impl PageDom for Document {
    fn url(&self) -> &str {
        &self.url
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.matches(self.body, selector) {
            out.push(self.body);
        }
        self.collect_descendants(self.body, selector, &mut out);
        out
    }

    fn query_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(scope, selector, &mut out);
        out
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.element(node).is_some_and(|e| selector.matches(e))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|e| e.parent)
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(node, &mut text);
        text
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.element_mut(node)?.children);
        for child in children {
            self.element_mut(child)?.parent = None;
        }
        self.element_mut(node)?.text = text.to_string();
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .and_then(|e| e.attributes.get(name))
            .cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element_mut(parent)?;
        self.element_mut(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.remove(child)?;
        self.element_mut(parent)?.children.push(child);
        self.element_mut(child)?.parent = Some(parent);

        if self.is_connected(parent) {
            self.emit(PageEvent::Mutation { added: vec![child] });
        }
        Ok(())
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.element(node).is_some() && self.is_inclusive_ancestor(self.body, node)
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(candidate) = current {
            match self.element(candidate) {
                Some(element) if element.is_hidden() => return false,
                Some(element) => current = element.parent,
                None => return false,
            }
        }
        true
    }

    fn dispatch_input(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element_mut(node)?;
        if !self.is_connected(node) {
            return Err(DomError::Detached(node));
        }
        self.input_log.push(node);
        Ok(())
    }

    fn click(&mut self, node: NodeId) -> Result<(), DomError> {
        if !self.is_connected(node) {
            self.element_mut(node)?;
            return Err(DomError::Detached(node));
        }

        let element = self.element_mut(node)?;
        if element.attributes.contains_key("disabled") {
            return Err(DomError::Disabled(node));
        }

        let activation = element.activation;

        match activation {
            Some(target) => {
                self.emit(PageEvent::ControlActivated {
                    control: node,
                    target,
                });
            }
            None => self.click_log.push(node),
        }
        Ok(())
    }

    fn bind_activation(&mut self, control: NodeId, target: NodeId) -> Result<(), DomError> {
        self.element_mut(target)?;
        self.element_mut(control)?.activation = Some(target);
        Ok(())
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PageEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }
}
