//! Radix tree with prefix completion.
//!
//! Each node stores one compressed edge label. Inserting a word that shares
//! only part of a label splits that node in place: the shared part stays, the
//! old remainder moves into a new child together with the node's children.
//!
//! Lookups complete a query to the full path of the deepest node the query
//! reaches. While walking, a label is compared up to but not including its
//! final position; when a query runs past a label, that final symbol is
//! stepped over without comparison. Single-symbol labels are unaffected since
//! their only symbol is the key used to select them.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::arena::{Label, Node, NodeArena, NodeId, SubtreeId};
use crate::Config;

/// Where an insertion walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// The word already ends at this node's boundary.
    Existing(NodeId),
    /// The word now ends at this node, which the walk created or shortened.
    Created(NodeId),
}

impl Placement {
    #[inline]
    pub(crate) fn node(self) -> NodeId {
        match self {
            Self::Existing(id) | Self::Created(id) => id,
        }
    }

    #[inline]
    pub(crate) fn is_created(self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Node reached by a lookup.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Descent {
    pub(crate) node: NodeId,
    /// Query symbols spent on the labels above `node`.
    pub(crate) consumed: usize,
}

#[inline]
fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[inline]
fn label_of<T: Clone>(symbols: &[T]) -> Label<T> {
    symbols.iter().cloned().collect()
}

/// A compressed trie mapping abbreviations to stored sequences.
///
/// ```rust
/// use abbrev_trie::PrefixTree;
///
/// let tree: PrefixTree<u8> = [b"test1", b"test2"].into_iter().collect();
/// assert_eq!(tree.get(b"te"), Some(b"test".to_vec()));
/// assert_eq!(tree.get(b"test1"), Some(b"test1".to_vec()));
/// assert_eq!(tree.get(b"x"), None);
/// ```
#[derive(Clone)]
pub struct PrefixTree<T> {
    pub(crate) arena: NodeArena<T>,
    /// Top-level nodes keyed by the first symbol of their label.
    pub(crate) roots: HashMap<T, NodeId>,
}

impl<T: Eq + Hash + Clone> PrefixTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            roots: HashMap::new(),
        }
    }

    /// Create an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            roots: HashMap::new(),
        }
    }

    /// Create an empty tree sized from `config`.
    pub fn with_config(config: &Config) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Number of nodes (compressed edges) in the tree.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Whether nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Approximate heap usage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage()
            + self.roots.capacity() * (std::mem::size_of::<T>() + std::mem::size_of::<NodeId>())
    }

    /// Release spare capacity held by nodes and maps.
    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
        self.roots.shrink_to_fit();
    }

    /// Insert `word`. Returns `true` iff the tree changed.
    ///
    /// Empty words and words already present are rejected.
    pub fn insert(&mut self, word: &[T]) -> bool {
        matches!(self.place(word), Some(Placement::Created(_)))
    }

    /// Complete `word` to the stored sequence it abbreviates.
    ///
    /// Returns `None` for an empty query, an unknown leading symbol, or a
    /// query that leaves the stored structure.
    pub fn get(&self, word: &[T]) -> Option<Vec<T>> {
        let found = self.descend(word)?;
        Some(self.completion(word, found))
    }

    /// Whether `word` ends exactly on a node boundary, i.e. inserting it
    /// again would be rejected.
    pub fn contains(&self, word: &[T]) -> bool {
        self.find(word).is_some()
    }

    /// Every sequence the tree can complete to, one per node, in no
    /// particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        let stack = self.roots.values().map(|&id| (id, 0)).collect();
        Iter {
            tree: self,
            stack,
            path: Vec::new(),
        }
    }

    /// Insertion walk shared with the delimited dictionary.
    ///
    /// Returns `None` only for an empty word.
    pub(crate) fn place(&mut self, word: &[T]) -> Option<Placement> {
        let first = word.first()?;
        let mut id = match self.roots.get(first) {
            Some(&root) => root,
            None => {
                let id = self.arena.alloc(Node::new(label_of(word), None, None));
                self.roots.insert(first.clone(), id);
                trace!(node = id.index(), label_len = word.len(), "created root");
                return Some(Placement::Created(id));
            }
        };

        let mut rest = word;
        loop {
            let node = self.arena.node(id);
            let len = node.label.len();
            let bound = len - 1;
            let matched = common_prefix_len(rest, &node.label[..bound]);
            let whole = matched == bound && rest.get(bound) == Some(&node.label[bound]);
            if !whole {
                return Some(self.split(id, matched, &rest[matched..]));
            }

            let leftover = &rest[len..];
            let Some(next) = leftover.first() else {
                return Some(Placement::Existing(id));
            };
            match node.child(next) {
                Some(child) => {
                    id = child;
                    rest = leftover;
                }
                None => {
                    let child = self.arena.alloc(Node::new(label_of(leftover), None, None));
                    self.arena.node_mut(id).children.insert(next.clone(), child);
                    trace!(
                        parent = id.index(),
                        node = child.index(),
                        label_len = leftover.len(),
                        "created child"
                    );
                    return Some(Placement::Created(child));
                }
            }
        }
    }

    /// Cut the label of `id` at `at`. The cut-off suffix takes over the
    /// node's children and secondary tree; a non-empty `leftover` becomes its
    /// sibling.
    fn split(&mut self, id: NodeId, at: usize, leftover: &[T]) -> Placement {
        let node = self.arena.node_mut(id);
        debug_assert!(at > 0, "divergence on the keyed symbol");
        debug_assert!(at < node.label.len());

        let suffix: Label<T> = node.label.drain(at..).collect();
        let children = std::mem::take(&mut node.children);
        let secondary = node.secondary.take();
        let suffix_key = suffix[0].clone();
        let suffix_len = suffix.len();

        let suffix_id = self.arena.alloc(Node::new(suffix, Some(children), secondary));
        self.arena
            .node_mut(id)
            .children
            .insert(suffix_key, suffix_id);
        debug!(
            node = id.index(),
            at,
            suffix_len,
            leftover_len = leftover.len(),
            "split node"
        );

        match leftover.first() {
            None => Placement::Created(id),
            Some(next) => {
                let child = self.arena.alloc(Node::new(label_of(leftover), None, None));
                self.arena.node_mut(id).children.insert(next.clone(), child);
                Placement::Created(child)
            }
        }
    }

    /// Completion walk. See the module docs for how labels are compared.
    pub(crate) fn descend(&self, word: &[T]) -> Option<Descent> {
        let mut id = *self.roots.get(word.first()?)?;
        let mut consumed = 0;
        loop {
            let node = self.arena.node(id);
            let rest = &word[consumed..];
            let bound = node.label.len() - 1;
            let matched = common_prefix_len(rest, &node.label[..bound]);
            if matched == rest.len() {
                return Some(Descent { node: id, consumed });
            }
            if matched < bound {
                return None;
            }

            let leftover = &rest[node.label.len()..];
            let Some(next) = leftover.first() else {
                return Some(Descent { node: id, consumed });
            };
            id = node.child(next)?;
            consumed += node.label.len();
        }
    }

    /// Consumed prefix of `word` followed by the full label at `found`.
    pub(crate) fn completion(&self, word: &[T], found: Descent) -> Vec<T> {
        let label = &self.arena.node(found.node).label;
        let mut out = Vec::with_capacity(found.consumed + label.len());
        out.extend_from_slice(&word[..found.consumed]);
        out.extend(label.iter().cloned());
        out
    }

    /// Exact-path search: the node whose boundary `word` ends on.
    pub(crate) fn find(&self, word: &[T]) -> Option<NodeId> {
        let mut id = *self.roots.get(word.first()?)?;
        let mut rest = word;
        loop {
            let node = self.arena.node(id);
            rest = rest.strip_prefix(node.label.as_slice())?;
            match rest.first() {
                None => return Some(id),
                Some(next) => id = node.child(next)?,
            }
        }
    }

    #[inline]
    pub(crate) fn secondary(&self, id: NodeId) -> Option<SubtreeId> {
        self.arena.node(id).secondary
    }

    #[inline]
    pub(crate) fn set_secondary(&mut self, id: NodeId, subtree: SubtreeId) {
        let node = self.arena.node_mut(id);
        debug_assert!(node.secondary.is_none());
        node.secondary = Some(subtree);
    }
}

impl PrefixTree<char> {
    /// [`insert`](Self::insert) for string input, one symbol per `char`.
    pub fn insert_str(&mut self, word: &str) -> bool {
        let word: Vec<char> = word.chars().collect();
        self.insert(&word)
    }

    /// [`get`](Self::get) for string input.
    pub fn get_str(&self, word: &str) -> Option<String> {
        let word: Vec<char> = word.chars().collect();
        self.get(&word).map(|found| found.into_iter().collect())
    }

    /// [`contains`](Self::contains) for string input.
    pub fn contains_str(&self, word: &str) -> bool {
        let word: Vec<char> = word.chars().collect();
        self.contains(&word)
    }
}

impl<T: Eq + Hash + Clone> Default for PrefixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone, W: AsRef<[T]>> Extend<W> for PrefixTree<T> {
    fn extend<I: IntoIterator<Item = W>>(&mut self, words: I) {
        for word in words {
            self.insert(word.as_ref());
        }
    }
}

impl<T: Eq + Hash + Clone, W: AsRef<[T]>> FromIterator<W> for PrefixTree<T> {
    fn from_iter<I: IntoIterator<Item = W>>(words: I) -> Self {
        let mut tree = Self::new();
        tree.extend(words);
        tree
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> fmt::Debug for PrefixTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Depth-first walk over every node's full path.
pub struct Iter<'a, T> {
    tree: &'a PrefixTree<T>,
    /// Pending nodes with the path length of their parent.
    stack: Vec<(NodeId, usize)>,
    path: Vec<T>,
}

impl<'a, T: Eq + Hash + Clone> Iter<'a, T> {
    pub(crate) fn next_entry(&mut self) -> Option<(NodeId, Vec<T>)> {
        let (id, depth) = self.stack.pop()?;
        let node = self.tree.arena.node(id);
        self.path.truncate(depth);
        self.path.extend(node.label.iter().cloned());
        let len = self.path.len();
        self.stack
            .extend(node.children.values().map(|&child| (child, len)));
        Some((id, self.path.clone()))
    }
}

impl<'a, T: Eq + Hash + Clone> Iterator for Iter<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|(_, path)| path)
    }
}
