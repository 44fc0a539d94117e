//! RSS 2.0 normalization onto the canonical Atom-shaped graph.
//!
//! A single dispatch pass over the direct children of `<channel>` (and, per
//! item, of each `<item>`) maps RSS tag names onto the same canonical field
//! names the Atom path populates, synthesizing Atom-shaped links, categories
//! and persons from RSS's flatter attributes. RSS date elements stay raw
//! text — `pubDate` was never RFC 3339 and is carried through undecoded.
//! Repeated singular elements overwrite (last wins); RSS has no
//! multiplicity rule. Scheduling elements (`lastBuildDate`, `ttl`,
//! `skipHours`, `skipMinutes`, `skipDays`) collect into [`CrawlHints`],
//! apart from the canonical feed.
//!
//! An item's `<source>` element references a whole other feed document by
//! URL. Resolution re-enters document-type detection and parser dispatch on
//! the fetched bytes — the one point where parsing a document can trigger
//! nested synchronous I/O. The fetch transport is an injected
//! [`SourceFetcher`]; resolution is bounded by a depth limit, a visited-URL
//! set, and a fetch timeout.

use std::collections::HashSet;
use std::time::Duration;

use crate::atom::parse_feed_element;
use crate::error::{FetchError, ParseError};
use crate::model::{
    Category, Content, CrawlHints, Entry, Feed, Generator, Link, Metadata, Person, Source, Text,
    Timestamp,
};
use crate::sniff::{document_kind, DocumentKind};
use crate::xml::{decode, Element};

/// Synchronous transport used to retrieve a nested `<source>` document.
///
/// Implementations decide how to honor `timeout`; the resolver passes the
/// configured [`RssOptions::source_fetch_timeout`] on every call.
pub trait SourceFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// Hardening knobs for nested `<source>` resolution.
#[derive(Debug, Clone)]
pub struct RssOptions {
    /// Maximum number of nested `<source>` resolutions below one parse
    /// call. Exceeding it fails with [`ParseError::SourceDepthExceeded`].
    pub max_source_depth: usize,
    /// Timeout handed to the fetcher for each source document.
    pub source_fetch_timeout: Duration,
}

impl Default for RssOptions {
    fn default() -> Self {
        Self {
            max_source_depth: 2,
            source_fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Resolves `<source>` references by fetching the referenced document and
/// re-entering the parser dispatch on it.
pub struct SourceResolver<'a> {
    fetcher: &'a dyn SourceFetcher,
    options: RssOptions,
}

impl<'a> SourceResolver<'a> {
    pub fn new(fetcher: &'a dyn SourceFetcher) -> SourceResolver<'a> {
        SourceResolver::with_options(fetcher, RssOptions::default())
    }

    pub fn with_options(fetcher: &'a dyn SourceFetcher, options: RssOptions) -> SourceResolver<'a> {
        SourceResolver { fetcher, options }
    }

    fn resolve(&self, url: &str, state: &mut ResolveState) -> Result<Source, ParseError> {
        if state.depth >= self.options.max_source_depth {
            return Err(ParseError::SourceDepthExceeded {
                url: url.to_string(),
                limit: self.options.max_source_depth,
            });
        }
        if !state.visited.insert(url.to_string()) {
            return Err(ParseError::SourceCycle {
                url: url.to_string(),
            });
        }

        let bytes = self.fetcher.fetch(url, self.options.source_fetch_timeout)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            ParseError::MalformedDocument(format!("source document at {} is not valid UTF-8", url))
        })?;
        let root = decode(&text)?;

        state.depth += 1;
        let source = match document_kind(&root) {
            // the nested document's own entries/items are not wanted here
            Some(DocumentKind::Atom) => {
                parse_feed_element(&root, Some(url), false).map(|feed| feed.metadata)
            }
            Some(DocumentKind::Rss2) => parse_channel_document(&root, false, Some(self), state)
                .map(|(feed, _)| feed.metadata),
            None => Err(ParseError::MalformedDocument(format!(
                "unrecognized feed document type at {}",
                url
            ))),
        };
        state.depth -= 1;
        // the set guards the active chain; siblings may cite the same URL
        state.visited.remove(url);
        source
    }
}

/// Per-parse-call resolution state, threaded through recursive calls.
#[derive(Default)]
struct ResolveState {
    depth: usize,
    visited: HashSet<String>,
}

/// Parses an RSS 2.0 document into the canonical feed graph plus its crawl
/// hints.
///
/// # Arguments
///
/// * `xml` - the RSS document text
/// * `include_items` - whether to normalize `<item>` children; pass `false`
///   when only the channel-level fields are needed
/// * `resolver` - collaborator for nested `<source>` resolution. With
///   `None`, `<source>` elements are left unresolved and the items kept.
///
/// # Errors
///
/// * [`ParseError::MalformedDocument`] - not well-formed XML, or no
///   `<channel>` element
/// * [`ParseError::Fetch`] - a `<source>` fetch failed
/// * [`ParseError::SourceDepthExceeded`] / [`ParseError::SourceCycle`] -
///   nested resolution exceeded its bounds
pub fn parse_rss(
    xml: &str,
    include_items: bool,
    resolver: Option<&SourceResolver<'_>>,
) -> Result<(Feed, CrawlHints), ParseError> {
    let root = decode(xml)?;
    parse_channel_root(&root, include_items, resolver)
}

/// Entry for callers that already hold a decoded document.
pub(crate) fn parse_channel_root(
    root: &Element,
    include_items: bool,
    resolver: Option<&SourceResolver<'_>>,
) -> Result<(Feed, CrawlHints), ParseError> {
    let mut state = ResolveState::default();
    parse_channel_document(root, include_items, resolver, &mut state)
}

fn parse_channel_document(
    root: &Element,
    include_items: bool,
    resolver: Option<&SourceResolver<'_>>,
    state: &mut ResolveState,
) -> Result<(Feed, CrawlHints), ParseError> {
    let channel = root.children_named(None, "channel").next().ok_or_else(|| {
        ParseError::MalformedDocument("rss document has no channel element".into())
    })?;

    let (metadata, hints) = normalize_channel(channel);
    let mut entries = Vec::new();
    if include_items {
        for item in channel.children_named(None, "item") {
            entries.push(normalize_item(item, resolver, state)?);
        }
    }
    Ok((Feed { metadata, entries }, hints))
}

fn normalize_channel(channel: &Element) -> (Metadata, CrawlHints) {
    let mut metadata = Metadata::default();
    let mut hints = CrawlHints::default();

    for child in &channel.children {
        if child.name.namespace.is_some() {
            continue;
        }
        let text = child.text.clone();
        match child.name.local.as_str() {
            "title" => metadata.title = Some(Text::plain(text)),
            "link" => metadata.links.push(alternate_link(text)),
            "description" => metadata.subtitle = Some(Text::plain(text)),
            "copyright" => metadata.rights = Some(Text::plain(text)),
            // RSS does not separate a person's name from their address
            "managingEditor" | "webMaster" => metadata.contributors.push(person_from_raw(text)),
            "pubDate" => metadata.updated_at = Some(Timestamp::Raw(text)),
            "category" => push_category(&mut metadata.categories, text),
            "generator" => {
                metadata.generator = Some(Generator {
                    value: text,
                    ..Generator::default()
                })
            }
            "lastBuildDate" => hints.last_build_date = Some(text),
            "ttl" => hints.ttl = Some(text),
            "skipHours" => hints.skip_hours = Some(text),
            "skipMinutes" => hints.skip_minutes = Some(text),
            "skipDays" => hints.skip_days = Some(text),
            _ => {}
        }
    }

    (metadata, hints)
}

fn normalize_item(
    item: &Element,
    resolver: Option<&SourceResolver<'_>>,
    state: &mut ResolveState,
) -> Result<Entry, ParseError> {
    let mut entry = Entry::default();

    for child in &item.children {
        if child.name.namespace.is_some() {
            continue;
        }
        let text = child.text.clone();
        match child.name.local.as_str() {
            "title" => entry.metadata.title = Some(Text::plain(text)),
            "link" => entry.metadata.links.push(alternate_link(text)),
            "description" => {
                entry.content = Some(Content {
                    value: text,
                    kind: "text".to_string(),
                    source_uri: None,
                })
            }
            "author" => entry.metadata.authors.push(person_from_raw(text)),
            "category" => push_category(&mut entry.metadata.categories, text),
            "comments" => entry.comments = Some(text),
            "enclosure" => entry.metadata.links.push(Link {
                uri: child.attribute("url").unwrap_or_default().to_string(),
                mimetype: child.attribute("type").map(str::to_string),
                ..Link::default()
            }),
            // guid text is the entry id verbatim; no base resolution applies
            "guid" => entry.metadata.id = Some(text),
            "pubDate" => entry.published_at = Some(Timestamp::Raw(text)),
            "source" => match (child.attribute("url"), resolver) {
                (Some(url), Some(resolver)) => {
                    entry.source = Some(resolver.resolve(url, state)?);
                }
                (Some(url), None) => {
                    tracing::debug!(url = %url,
                        "No source resolver configured, leaving <source> unresolved");
                }
                (None, _) => {
                    tracing::warn!("Ignoring <source> element without url attribute");
                }
            },
            _ => {}
        }
    }

    Ok(entry)
}

fn alternate_link(uri: String) -> Link {
    Link {
        uri,
        relation: Some("alternate".to_string()),
        mimetype: Some("text/html".to_string()),
        ..Link::default()
    }
}

fn person_from_raw(text: String) -> Person {
    Person {
        name: Some(text.clone()),
        email: Some(text),
        uri: None,
    }
}

fn push_category(categories: &mut Vec<Category>, term: String) {
    if term.is_empty() {
        tracing::debug!("Skipping category element with empty text");
        return;
    }
    categories.push(Category {
        term,
        scheme_uri: None,
        label: None,
    });
}
