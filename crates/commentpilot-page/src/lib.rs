//! In-memory host page for CommentPilot.
//!
//! [`Document`] implements [`PageDom`](commentpilot_protocols::PageDom) over a
//! node arena. It mirrors the parts of a browser DOM the assistant relies on:
//! structural queries, ancestor walks, text and attribute access, insertion
//! with mutation notifications, SPA-style navigation, and click interception
//! for bound controls. It also records what the host page's own handlers
//! would have observed (native input notifications and clicks), which is what
//! tests assert against.

mod document;
mod element;

pub use document::Document;
pub use element::Element;
