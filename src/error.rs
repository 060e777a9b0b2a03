//! Outcomes of strict lookups.

use thiserror::Error;

/// Why [`DelimitedDictionary::resolve`](crate::DelimitedDictionary::resolve)
/// could not complete a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError<T> {
    /// The query was empty.
    #[error("empty query")]
    EmptyQuery,

    /// No stored head is reachable from the part before the delimiter.
    #[error("no stored head matches the query")]
    UnknownHead,

    /// The head resolved but the tail after the delimiter did not.
    #[error("query tail does not resolve under the matched head")]
    UnresolvedTail {
        /// Completed head followed by the delimiter.
        partial: Vec<T>,
    },
}

impl<T> ResolveError<T> {
    /// Truncated completion carried by [`ResolveError::UnresolvedTail`].
    pub fn partial(&self) -> Option<&[T]> {
        match self {
            Self::UnresolvedTail { partial } => Some(partial.as_slice()),
            _ => None,
        }
    }
}
