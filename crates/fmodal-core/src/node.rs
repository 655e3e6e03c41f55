#![forbid(unsafe_code)]

//! Node handles used to tell "inside" from "outside".
//!
//! A modal never renders anything itself; it only needs to answer one
//! question about the surface the caller rendered: *does this event target
//! live inside the container?* That question is the [`Containment`] trait.
//!
//! - [`NodeId`] is the opaque identity a host stamps on pointer events.
//! - [`NodeTree`] is a minimal arena of parent links for hosts that do not
//!   have their own tree; [`TreeNode`] answers containment by walking it.
//! - [`NodeRef`] is the shared slot the renderer attaches its container node
//!   to. Clones share the slot, so the modal and the renderer see the same
//!   node without re-plumbing.
//!
//! # Invariants
//!
//! 1. A node contains itself.
//! 2. A `None` target is never contained.
//! 3. An empty [`NodeRef`] contains nothing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Opaque identity of a UI node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a host-provided raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Subtree-containment test for a container node.
pub trait Containment {
    /// Whether `target` is this node or one of its descendants.
    fn contains(&self, target: Option<NodeId>) -> bool;
}

impl<F> Containment for F
where
    F: Fn(Option<NodeId>) -> bool,
{
    fn contains(&self, target: Option<NodeId>) -> bool {
        self(target)
    }
}

/// Arena of parent links.
///
/// Cloning a `NodeTree` creates a new handle to the **same** arena.
#[derive(Clone, Default)]
pub struct NodeTree {
    parents: Rc<RefCell<Vec<Option<NodeId>>>>,
}

impl NodeTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with no parent.
    pub fn create_root(&self) -> NodeId {
        self.push(None)
    }

    /// Create a node under `parent`.
    pub fn append_child(&self, parent: NodeId) -> NodeId {
        self.push(Some(parent))
    }

    /// Detach a node from its parent. Its own subtree stays intact.
    pub fn detach(&self, node: NodeId) {
        if let Some(slot) = self.parents.borrow_mut().get_mut(node.0 as usize) {
            *slot = None;
        }
    }

    /// Parent of `node`, if it has one.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.borrow().get(node.0 as usize).copied().flatten()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let parents = self.parents.borrow();
        let mut cursor = Some(node);
        // Bounded by arena size so a corrupted parent chain cannot spin forever.
        for _ in 0..=parents.len() {
            match cursor {
                Some(current) if current == ancestor => return true,
                Some(current) => {
                    cursor = parents.get(current.0 as usize).copied().flatten();
                }
                None => return false,
            }
        }
        false
    }

    /// Containment handle for `node`.
    #[must_use]
    pub fn node(&self, node: NodeId) -> TreeNode {
        TreeNode {
            tree: self.clone(),
            id: node,
        }
    }

    /// Number of nodes ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.borrow().len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.borrow().is_empty()
    }

    fn push(&self, parent: Option<NodeId>) -> NodeId {
        let mut parents = self.parents.borrow_mut();
        let id = NodeId(parents.len() as u64);
        parents.push(parent);
        id
    }
}

impl fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTree")
            .field("len", &self.len())
            .finish()
    }
}

/// A node inside a [`NodeTree`].
#[derive(Clone, Debug)]
pub struct TreeNode {
    tree: NodeTree,
    id: NodeId,
}

impl TreeNode {
    /// Identity of this node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Containment for TreeNode {
    fn contains(&self, target: Option<NodeId>) -> bool {
        target.is_some_and(|target| self.tree.is_inclusive_ancestor(self.id, target))
    }
}

/// Shared, possibly-empty container handle.
///
/// The caller attaches this to its rendered surface; the modal reads it when
/// classifying clicks. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct NodeRef {
    current: Rc<RefCell<Option<Rc<dyn Containment>>>>,
}

impl NodeRef {
    /// Create an empty handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle already pointing at `node`.
    #[must_use]
    pub fn with_node(node: impl Containment + 'static) -> Self {
        let handle = Self::new();
        handle.set(node);
        handle
    }

    /// Attach a node.
    pub fn set(&self, node: impl Containment + 'static) {
        *self.current.borrow_mut() = Some(Rc::new(node));
    }

    /// Detach the current node, leaving the handle empty.
    pub fn clear(&self) {
        self.current.borrow_mut().take();
    }

    /// Whether a node is attached.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// The attached node, if any.
    #[must_use]
    pub fn get(&self) -> Option<Rc<dyn Containment>> {
        self.current.borrow().clone()
    }

    /// Whether the attached node contains `target`. Empty handles contain nothing.
    #[must_use]
    pub fn contains(&self, target: Option<NodeId>) -> bool {
        // Clone out first so a containment test may touch the handle.
        let node = self.get();
        node.is_some_and(|node| node.contains(target))
    }

    /// Whether two handles share the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.current, &other.current)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("is_set", &self.is_set())
            .finish()
    }
}
