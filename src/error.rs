//! Error types for feed parsing.

use thiserror::Error;

/// Errors that can abort a parse call.
///
/// A parse either returns a complete, internally consistent canonical graph
/// or fails with one of these kinds — there is no partial-success output.
/// Absent optional elements and unrecognized elements or attributes are
/// never errors.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A singular Atom meta element occurred more than once in its parent.
    /// Carries the fully-qualified name of the offending element.
    #[error("multiple {element} elements exist")]
    Multiplicity { element: String },

    /// A date construct held text that is not a valid RFC 3339 timestamp.
    #[error("malformed RFC 3339 timestamp {value:?}: {source}")]
    DateFormat {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The document could not be decoded into an element tree, or its shape
    /// is unusable (no root, missing `channel`, unrecognized nested source).
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Fetching a nested RSS `<source>` document failed. Distinct from
    /// document errors so callers can apply their own retry policy.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A chain of nested `<source>` references exceeded the configured
    /// depth bound.
    #[error("nested <source> resolution exceeded depth {limit} at {url}")]
    SourceDepthExceeded { url: String, limit: usize },

    /// A nested `<source>` reference pointed back to a document already
    /// being resolved in this parse call.
    #[error("nested <source> cycle detected at {url}")]
    SourceCycle { url: String },
}

/// Network failure reported by a [`SourceFetcher`] implementation.
///
/// [`SourceFetcher`]: crate::rss2::SourceFetcher
#[derive(Debug, Error)]
#[error("failed to fetch source document from {url}: {reason}")]
pub struct FetchError {
    /// The URL that was being fetched.
    pub url: String,
    /// Transport-level description of the failure.
    pub reason: String,
}

pub type Result<T> = std::result::Result<T, ParseError>;
