//! Delimiter-aware dictionary.
//!
//! Keys are split at the first occurrence of the delimiter into a head and a
//! tail. Heads live in one [`PrefixTree`]; every head node that was ever
//! followed by a tail owns a secondary tree holding those tails. Delimiters
//! after the first are ordinary symbols of the tail.

use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::arena::{NodeId, SubtreeId};
use crate::error::ResolveError;
use crate::tree::{self, PrefixTree};
use crate::{Config, TailPolicy};

/// Dictionary of compound keys such as `remote-add`, completing head and tail
/// independently.
///
/// ```rust
/// use abbrev_trie::DelimitedDictionary;
///
/// let dict = DelimitedDictionary::from_words('-', [
///     "test1-test1".chars().collect::<Vec<_>>(),
///     "test2-test2".chars().collect(),
/// ]);
/// assert_eq!(dict.get_str("test2-t").as_deref(), Some("test2-test2"));
/// assert_eq!(dict.get_str("t").as_deref(), Some("test"));
/// ```
#[derive(Clone)]
pub struct DelimitedDictionary<T> {
    delimiter: T,
    pub(crate) heads: PrefixTree<T>,
    /// Secondary trees, addressed by the `SubtreeId` stored on head nodes.
    pub(crate) tails: Vec<PrefixTree<T>>,
    tail_policy: TailPolicy,
}

impl<T: Eq + Hash + Clone> DelimitedDictionary<T> {
    /// Create an empty dictionary splitting keys at `delimiter`.
    pub fn new(delimiter: T) -> Self {
        Self::with_config(delimiter, Config::default())
    }

    /// Create an empty dictionary with explicit options.
    pub fn with_config(delimiter: T, config: Config) -> Self {
        Self {
            delimiter,
            heads: PrefixTree::with_config(&config),
            tails: Vec::new(),
            tail_policy: config.tail_policy,
        }
    }

    /// Create a dictionary holding `words`, inserted in order.
    pub fn from_words<I, W>(delimiter: T, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[T]>,
    {
        let mut dict = Self::new(delimiter);
        dict.extend(words);
        dict
    }

    /// The symbol keys are split at. Fixed for the dictionary's lifetime.
    pub fn delimiter(&self) -> &T {
        &self.delimiter
    }

    /// Number of nodes in the head index.
    pub fn head_count(&self) -> usize {
        self.heads.node_count()
    }

    /// Number of secondary (tail) trees.
    pub fn tail_tree_count(&self) -> usize {
        self.tails.len()
    }

    /// Whether nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Approximate heap usage in bytes, secondary trees included.
    pub fn memory_usage(&self) -> usize {
        self.heads.memory_usage()
            + self.tails.capacity() * std::mem::size_of::<PrefixTree<T>>()
            + self.tails.iter().map(PrefixTree::memory_usage).sum::<usize>()
    }

    /// Split at the first delimiter. The tail is `None` when there is no
    /// delimiter and may be empty when the key ends with one.
    fn split_key<'a>(&self, word: &'a [T]) -> (&'a [T], Option<&'a [T]>) {
        match word.iter().position(|symbol| *symbol == self.delimiter) {
            Some(pos) => (&word[..pos], Some(&word[pos + 1..])),
            None => (word, None),
        }
    }

    #[inline]
    fn tail_tree(&self, id: NodeId) -> Option<&PrefixTree<T>> {
        self.heads
            .secondary(id)
            .map(|subtree| &self.tails[subtree.index()])
    }

    /// Insert a compound key. Returns `true` iff the dictionary changed.
    ///
    /// Keys with an empty head (empty, or starting with the delimiter) are
    /// rejected. An empty tail is treated like no tail.
    pub fn insert(&mut self, word: &[T]) -> bool {
        let (head, tail) = self.split_key(word);
        let Some(placement) = self.heads.place(head) else {
            return false;
        };
        match tail.filter(|tail| !tail.is_empty()) {
            None => placement.is_created(),
            Some(tail) => {
                let routed = self.route_tail(placement.node(), tail);
                placement.is_created() || routed
            }
        }
    }

    fn route_tail(&mut self, id: NodeId, tail: &[T]) -> bool {
        if let Some(subtree) = self.heads.secondary(id) {
            return self.tails[subtree.index()].insert(tail);
        }

        let subtree = SubtreeId::new(self.tails.len());
        let mut tree = PrefixTree::new();
        tree.insert(tail);
        self.tails.push(tree);
        self.heads.set_secondary(id, subtree);
        debug!(
            node = id.index(),
            subtree = subtree.index(),
            "created tail tree"
        );
        true
    }

    /// Complete a compound query.
    ///
    /// The head is completed through the head index; if the query carried a
    /// delimiter it is appended, followed by the completion of a non-empty
    /// tail. When the tail does not resolve, the outcome depends on the
    /// configured [`TailPolicy`].
    pub fn get(&self, word: &[T]) -> Option<Vec<T>> {
        match self.resolve(word) {
            Ok(found) => Some(found),
            Err(ResolveError::UnresolvedTail { partial })
                if self.tail_policy == TailPolicy::Truncate =>
            {
                Some(partial)
            }
            Err(_) => None,
        }
    }

    /// Complete a compound query, reporting precisely why it failed.
    pub fn resolve(&self, word: &[T]) -> Result<Vec<T>, ResolveError<T>> {
        if word.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }
        let (head, tail) = self.split_key(word);
        let found = self.heads.descend(head).ok_or(ResolveError::UnknownHead)?;
        let mut out = self.heads.completion(head, found);

        let Some(tail) = tail else {
            return Ok(out);
        };
        out.push(self.delimiter.clone());
        if tail.is_empty() {
            return Ok(out);
        }
        match self.tail_tree(found.node).and_then(|tree| tree.get(tail)) {
            Some(rest) => {
                out.extend(rest);
                Ok(out)
            }
            None => Err(ResolveError::UnresolvedTail { partial: out }),
        }
    }

    /// Whether `word` is stored exactly, i.e. inserting it would be rejected.
    pub fn contains(&self, word: &[T]) -> bool {
        let (head, tail) = self.split_key(word);
        let Some(id) = self.heads.find(head) else {
            return false;
        };
        match tail.filter(|tail| !tail.is_empty()) {
            None => true,
            Some(tail) => self
                .tail_tree(id)
                .is_some_and(|tree| tree.contains(tail)),
        }
    }

    /// Every head path, plus `head ++ delimiter ++ tail` for every path of
    /// the head's secondary tree, in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            dict: self,
            heads: self.heads.iter(),
            pending: None,
        }
    }
}

impl DelimitedDictionary<char> {
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

    /// [`resolve`](Self::resolve) for string input.
    pub fn resolve_str(&self, word: &str) -> Result<String, ResolveError<char>> {
        let word: Vec<char> = word.chars().collect();
        self.resolve(&word).map(|found| found.into_iter().collect())
    }
}

impl<T: Eq + Hash + Clone, W: AsRef<[T]>> Extend<W> for DelimitedDictionary<T> {
    fn extend<I: IntoIterator<Item = W>>(&mut self, words: I) {
        for word in words {
            self.insert(word.as_ref());
        }
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> fmt::Debug for DelimitedDictionary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimitedDictionary")
            .field("delimiter", &self.delimiter)
            .field("keys", &KeySet(self))
            .finish()
    }
}

struct KeySet<'a, T>(&'a DelimitedDictionary<T>);

impl<T: Eq + Hash + Clone + fmt::Debug> fmt::Debug for KeySet<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

/// Walk over every stored head and compound key.
pub struct Iter<'a, T> {
    dict: &'a DelimitedDictionary<T>,
    heads: tree::Iter<'a, T>,
    /// Head path and the walk over its tails, drained before moving on.
    pending: Option<(Vec<T>, tree::Iter<'a, T>)>,
}

impl<'a, T: Eq + Hash + Clone> Iterator for Iter<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((head, tails)) = &mut self.pending {
            if let Some(tail) = tails.next() {
                let mut key = Vec::with_capacity(head.len() + 1 + tail.len());
                key.extend_from_slice(head);
                key.push(self.dict.delimiter.clone());
                key.extend(tail);
                return Some(key);
            }
            self.pending = None;
        }

        let (id, head) = self.heads.next_entry()?;
        if let Some(tree) = self.dict.tail_tree(id) {
            self.pending = Some((head.clone(), tree.iter()));
        }
        Some(head)
    }
}
