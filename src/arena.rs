//! Flat node storage.
//!
//! Nodes never move once allocated and are never freed individually, so a
//! `NodeId` stays valid for the lifetime of the tree that handed it out.

use std::collections::HashMap;
use std::hash::Hash;

use smallvec::SmallVec;

/// Compressed edge label. Command words are short, so most stay inline.
pub(crate) type Label<T> = SmallVec<[T; 8]>;

/// Handles are 32 bits wide, so one arena (or one dictionary's set of tail
/// trees) holds at most `u32::MAX + 1` entries.
fn handle(index: usize) -> u32 {
    u32::try_from(index).expect("arena handle space exhausted")
}

/// Handle to a node inside one `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(handle(index))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a secondary (tail) tree owned by a `DelimitedDictionary`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SubtreeId(u32);

impl SubtreeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(handle(index))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) label: Label<T>,
    /// Keyed by the first symbol of the child's label.
    pub(crate) children: HashMap<T, NodeId>,
    pub(crate) secondary: Option<SubtreeId>,
}

impl<T: Eq + Hash> Node<T> {
    pub(crate) fn new(
        label: Label<T>,
        children: Option<HashMap<T, NodeId>>,
        secondary: Option<SubtreeId>,
    ) -> Self {
        debug_assert!(!label.is_empty(), "node label must not be empty");
        Self {
            label,
            children: children.unwrap_or_default(),
            secondary,
        }
    }

    #[inline]
    pub(crate) fn child(&self, symbol: &T) -> Option<NodeId> {
        self.children.get(symbol).copied()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct NodeArena<T> {
    nodes: Vec<Node<T>>,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId::new(idx), node))
    }

    /// Approximate heap bytes held by the arena, labels and child maps included.
    pub(crate) fn memory_usage(&self) -> usize {
        let mut bytes = self.nodes.capacity() * std::mem::size_of::<Node<T>>();
        for node in &self.nodes {
            if node.label.spilled() {
                bytes += node.label.capacity() * std::mem::size_of::<T>();
            }
            bytes += node.children.capacity()
                * (std::mem::size_of::<T>() + std::mem::size_of::<NodeId>());
        }
        bytes
    }

    pub(crate) fn shrink_to_fit(&mut self)
    where
        T: Eq + Hash,
    {
        self.nodes.shrink_to_fit();
        for node in &mut self.nodes {
            node.label.shrink_to_fit();
            node.children.shrink_to_fit();
        }
    }
}
