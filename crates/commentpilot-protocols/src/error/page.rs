//! Page model errors.

use thiserror::Error;

use crate::page::NodeId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Node is detached from the document: {0}")]
    Detached(NodeId),

    #[error("Cannot insert {child} into its own descendant {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Element is disabled: {0}")]
    Disabled(NodeId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{found}' at position {position}")]
    Unexpected { position: usize, found: char },

    #[error("Unterminated {0}")]
    Unterminated(&'static str),

    #[error("Combinators are not supported: {0}")]
    UnsupportedCombinator(String),
}
