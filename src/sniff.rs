//! Document-type detection and parser dispatch.
//!
//! Classifies a decoded document as Atom 1.0 or RSS 2.0 by its root element
//! and hands it to the matching parser. Nested `<source>` resolution
//! re-enters through the same dispatch.

use crate::atom::{parse_feed_element, XMLNS_ATOM};
use crate::error::ParseError;
use crate::model::{CrawlHints, Feed};
use crate::rss2::{parse_channel_root, SourceResolver};
use crate::xml::{decode, Element};

/// Syndication format of a feed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Atom,
    Rss2,
}

/// Classifies a decoded document by its root element.
///
/// A `feed` root (Atom-namespaced or bare) is Atom; an `rss` root is
/// RSS 2.0. Anything else is unrecognized.
pub(crate) fn document_kind(root: &Element) -> Option<DocumentKind> {
    match (root.name.namespace.as_deref(), root.name.local.as_str()) {
        (Some(XMLNS_ATOM), "feed") | (None, "feed") => Some(DocumentKind::Atom),
        (None, "rss") => Some(DocumentKind::Rss2),
        _ => None,
    }
}

/// Detects the syndication format of a document.
///
/// # Errors
///
/// [`ParseError::MalformedDocument`] when the input is not well-formed XML
/// or its root element belongs to neither format.
pub fn detect(xml: &str) -> Result<DocumentKind, ParseError> {
    let root = decode(xml)?;
    document_kind(&root).ok_or_else(|| {
        ParseError::MalformedDocument(format!(
            "unrecognized feed document with root element {}",
            root.name.qualified()
        ))
    })
}

/// Parses a feed document of either format, dispatching on its root
/// element.
///
/// # Arguments
///
/// * `xml` - the document text
/// * `feed_url` - retrieval URL, used as the top-level base on the Atom
///   path (the RSS path applies no base resolution)
/// * `include_entries` - whether to parse entries/items
/// * `resolver` - nested `<source>` collaborator for the RSS path
///
/// # Returns
///
/// The canonical feed and, for RSS documents, the crawl hints.
pub fn parse_feed(
    xml: &str,
    feed_url: Option<&str>,
    include_entries: bool,
    resolver: Option<&SourceResolver<'_>>,
) -> Result<(Feed, Option<CrawlHints>), ParseError> {
    let root = decode(xml)?;
    match document_kind(&root) {
        Some(DocumentKind::Atom) => {
            let feed = parse_feed_element(&root, feed_url, include_entries)?;
            Ok((feed, None))
        }
        Some(DocumentKind::Rss2) => {
            let (feed, hints) = parse_channel_root(&root, include_entries, resolver)?;
            Ok((feed, Some(hints)))
        }
        None => Err(ParseError::MalformedDocument(format!(
            "unrecognized feed document with root element {}",
            root.name.qualified()
        ))),
    }
}
