//! # abbrev-trie
//!
//! A dictionary of command-like symbol sequences that expands any unambiguous
//! abbreviation to the full stored sequence.
//!
//! Sequences are kept in a compressed trie (radix tree). Two words sharing a
//! prefix share one node for it, so the shared part alone is enough to
//! address it: after storing `test1` and `test2`, the query `t` completes to
//! `test`.
//!
//! [`DelimitedDictionary`] adds one designated delimiter symbol. A key such
//! as `remote-add` is split at its first delimiter into a head (`remote`) and
//! a tail (`add`), and each part is completed independently.
//!
//! ## Example
//!
//! ```rust
//! use abbrev_trie::{DelimitedDictionary, PrefixTree};
//!
//! let mut tree: PrefixTree<char> = PrefixTree::new();
//! tree.insert_str("test1");
//! tree.insert_str("test2");
//! assert_eq!(tree.get_str("t").as_deref(), Some("test"));
//! assert_eq!(tree.get_str("test2").as_deref(), Some("test2"));
//!
//! let mut dict = DelimitedDictionary::new('-');
//! dict.insert_str("remote-add");
//! dict.insert_str("remote-remove");
//! assert_eq!(dict.get_str("rem-a").as_deref(), Some("remote-add"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod arena;
pub mod dict;
pub mod error;
pub mod tree;

pub use dict::DelimitedDictionary;
pub use error::ResolveError;
pub use tree::PrefixTree;

/// Default node capacity reserved up front.
const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// What [`DelimitedDictionary::get`] returns when a query carries a tail that
/// does not resolve under the matched head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailPolicy {
    /// Return the completed head followed by the delimiter.
    #[default]
    Truncate,
    /// Treat the whole query as not found.
    Reject,
}

/// Construction options for [`PrefixTree`] and [`DelimitedDictionary`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial capacity hint for the number of nodes
    pub initial_capacity: usize,
    /// Handling of unresolved tails (delimited dictionaries only)
    pub tail_policy: TailPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            tail_policy: TailPolicy::default(),
        }
    }
}


#[cfg(test)]
mod proptests;
