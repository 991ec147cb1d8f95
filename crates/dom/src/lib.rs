#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]
//! Minimal element tree for render targets.
//!
//! Content units draw into detached elements created from a shared
//! [`Document`]. Containers later mount those elements under a wrapper. Only
//! structure, tag names, class lists and text are tracked; there is no
//! styling or layout here.

pub mod tree;

pub use tree::{Document, DomNode, NodeKind, NodeRef};
