use core::cell::RefCell;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;

use anyhow::{Error, anyhow};
use indextree::{Arena, NodeId};
use log::trace;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug, Clone)]
pub struct DomNode {
    pub kind: NodeKind,
    pub classes: SmallVec<[String; 4]>,
}

impl DomNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            classes: SmallVec::new(),
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            classes: SmallVec::new(),
        }
    }
}

/// Shared arena of nodes. Cloning yields another handle to the same tree.
#[derive(Clone, Default)]
pub struct Document {
    arena: Rc<RefCell<Arena<DomNode>>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeRef {
        let id = self.arena.borrow_mut().new_node(DomNode::element(tag));
        trace!(target: "dom", "created <{tag}> as {id:?}");
        NodeRef {
            document: self.clone(),
            id,
        }
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeRef {
        let id = self.arena.borrow_mut().new_node(DomNode::text(text));
        NodeRef {
            document: self.clone(),
            id,
        }
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.arena.borrow().count()
    }

    /// Whether both handles refer to the same tree.
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }
}

impl Debug for Document {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("Document")
            .field("nodes", &self.node_count())
            .finish()
    }
}

/// Handle to one node of a [`Document`].
#[derive(Clone)]
pub struct NodeRef {
    document: Document,
    id: NodeId,
}

impl NodeRef {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Lowercased tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        self.with_node(|node| match &node.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Text { .. } => None,
        })
        .flatten()
    }

    /// Add a class token. Empty tokens and duplicates are ignored.
    pub fn add_class(&self, class: &str) {
        let token = class.trim();
        if token.is_empty() {
            return;
        }
        let mut arena = self.document.arena.borrow_mut();
        if let Some(node) = arena.get_mut(self.id) {
            let data = node.get_mut();
            if !data.classes.iter().any(|existing| existing == token) {
                data.classes.push(token.to_owned());
            }
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.with_node(|node| node.classes.iter().any(|existing| existing == class))
            .unwrap_or(false)
    }

    pub fn classes(&self) -> Vec<String> {
        self.with_node(|node| node.classes.to_vec())
            .unwrap_or_default()
    }

    /// Append `child` as the last child of this node, detaching it from any
    /// previous parent first.
    ///
    /// # Errors
    /// Returns an error if the nodes belong to different documents or if the
    /// append would create a cycle.
    pub fn append_child(&self, child: &Self) -> Result<(), Error> {
        if !self.document.same(&child.document) {
            return Err(anyhow!(
                "cannot append {:?} under {:?}: nodes belong to different documents",
                child.id,
                self.id
            ));
        }
        let mut arena = self.document.arena.borrow_mut();
        self.id
            .checked_append(child.id, &mut arena)
            .map_err(|err| anyhow!("cannot append {:?} under {:?}: {err}", child.id, self.id))
    }

    pub fn parent(&self) -> Option<Self> {
        let arena = self.document.arena.borrow();
        let parent = arena.get(self.id)?.parent()?;
        Some(Self {
            document: self.document.clone(),
            id: parent,
        })
    }

    pub fn children(&self) -> Vec<Self> {
        let arena = self.document.arena.borrow();
        self.id
            .children(&arena)
            .map(|id| Self {
                document: self.document.clone(),
                id,
            })
            .collect()
    }

    pub fn is_detached(&self) -> bool {
        self.parent().is_none()
    }

    /// Concatenated text of every descendant text node, in document order.
    pub fn text_content(&self) -> String {
        let arena = self.document.arena.borrow();
        self.id
            .descendants(&arena)
            .filter_map(|id| match &arena.get(id)?.get().kind {
                NodeKind::Text { text } => Some(text.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect()
    }

    fn with_node<T>(&self, read: impl FnOnce(&DomNode) -> T) -> Option<T> {
        let arena = self.document.arena.borrow();
        arena.get(self.id).map(|node| read(node.get()))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.document.same(&other.document)
    }
}

impl Eq for NodeRef {}

impl Debug for NodeRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("NodeRef")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}
