//! Canonical feed normalization for Atom 1.0 and RSS 2.0.
//!
//! Both formats translate into one format-agnostic object graph
//! ([`Feed`]/[`Entry`]/[`model::Source`] and their sub-structures), so a
//! downstream aggregator consumes a single shape regardless of what a
//! publisher serves.
//!
//! # Architecture
//!
//! - [`xml`] - decodes a document into a navigable element tree
//! - [`base`] - effective base URI computation (`xml:base` chain falling
//!   back to the retrieval URL) and base-relative joining
//! - [`atom`] - construct and root parsers for Atom 1.0, with per-field
//!   cardinality enforcement
//! - [`rss2`] - tag-dispatch normalizer mapping RSS 2.0 onto the same
//!   canonical fields, crawl-hint collection, and nested `<source>`
//!   resolution through an injected fetcher
//! - [`sniff`] - document-type detection and parser dispatch
//!
//! Parsing is single-threaded, synchronous recursive descent. No state
//! survives a parse call, so concurrent independent calls need no
//! coordination. The only blocking point is nested `<source>` resolution,
//! which is bounded by [`rss2::RssOptions`].
//!
//! # Example
//!
//! ```
//! use canonfeed::parse_atom;
//!
//! let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
//!     <title>Example</title>
//!     <updated>2024-01-01T00:00:00Z</updated>
//!     <link href="/a" rel="alternate"/>
//! </feed>"#;
//! let (feed, hints) = parse_atom(xml, Some("http://ex.com/"), true)?;
//! assert_eq!(feed.metadata.title.unwrap().value, "Example");
//! assert_eq!(feed.metadata.links[0].uri, "http://ex.com/a");
//! assert!(hints.is_none()); // Atom carries no crawl hints
//! # Ok::<(), canonfeed::ParseError>(())
//! ```

pub mod atom;
pub mod base;
pub mod error;
pub mod model;
pub mod rss2;
pub mod sniff;
pub mod xml;

pub use atom::parse_atom;
pub use error::{FetchError, ParseError, Result};
pub use model::{
    Category, Content, CrawlHints, Entry, Feed, Generator, Link, Metadata, Person, Source, Text,
    TextKind, Timestamp,
};
pub use rss2::{parse_rss, RssOptions, SourceFetcher, SourceResolver};
pub use sniff::{detect, parse_feed, DocumentKind};
