//! Canonical feed value types.
//!
//! Both the Atom parser and the RSS 2.0 normalizer populate this one
//! format-agnostic object graph. Values are created fresh per parse call,
//! fully populated by the time an entry point returns, and owned solely by
//! the caller afterwards — the parsers hold no cross-call state.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// A point in time attached to a feed or entry.
///
/// Atom date constructs are decoded as RFC 3339 into `Rfc3339`. RSS 2.0
/// `pubDate` values are carried verbatim as `Raw` — the original pipeline
/// never decoded them, and downstream consumers expect the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Timestamp {
    /// A decoded, timezone-aware instant.
    Rfc3339(DateTime<FixedOffset>),
    /// Verbatim date text from an RSS 2.0 element.
    Raw(String),
}

impl Timestamp {
    /// The decoded instant, if this timestamp was parsed from RFC 3339 text.
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Timestamp::Rfc3339(dt) => Some(*dt),
            Timestamp::Raw(_) => None,
        }
    }

    /// The verbatim text, if this timestamp was carried through undecoded.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Timestamp::Rfc3339(_) => None,
            Timestamp::Raw(value) => Some(value),
        }
    }
}

/// Content model of a text construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    #[default]
    Text,
    Html,
    Xhtml,
}

/// A human-readable text construct (title, subtitle, rights, summary).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Text {
    pub kind: TextKind,
    /// Raw text content. Empty when the construct's type is `xhtml` —
    /// xhtml content models are not decoded.
    pub value: String,
}

impl Text {
    /// A plain-text construct, the shape the RSS normalizer synthesizes.
    pub fn plain(value: impl Into<String>) -> Text {
        Text {
            kind: TextKind::Text,
            value: value.into(),
        }
    }
}

/// An author or contributor. All fields are optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Person {
    pub name: Option<String>,
    /// Resolved against the effective base URI where the person appeared.
    pub uri: Option<String>,
    pub email: Option<String>,
}

/// A reference to a related resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Link {
    /// Resolved against the effective base URI. Empty when the source
    /// element carried no `href`.
    pub uri: String,
    pub relation: Option<String>,
    pub mimetype: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
    pub byte_size: Option<String>,
}

/// A classification term. A category without a term does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub term: String,
    pub scheme_uri: Option<String>,
    pub label: Option<String>,
}

/// The agent that produced the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Generator {
    pub value: String,
    /// Resolved against the effective base URI, when present.
    pub uri: Option<String>,
    pub version: Option<String>,
}

/// Entry content: either inline text or an out-of-line reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub value: String,
    /// Media type of the content, `"text"` when unspecified.
    pub kind: String,
    /// Present only when the source element carried a `src` attribute;
    /// resolved against the effective base URI.
    pub source_uri: Option<String>,
}

/// Fields shared by feed, entry, and nested source elements.
///
/// Singular fields occur zero-or-once in the source document; plural fields
/// preserve document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Metadata {
    pub id: Option<String>,
    pub title: Option<Text>,
    pub updated_at: Option<Timestamp>,
    pub authors: Vec<Person>,
    pub categories: Vec<Category>,
    pub contributors: Vec<Person>,
    pub links: Vec<Link>,
    pub generator: Option<Generator>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub rights: Option<Text>,
    pub subtitle: Option<Text>,
}

/// The feed an entry was republished from, embedded under the entry.
///
/// A source carries the same field set as a feed, minus the entries.
pub type Source = Metadata;

/// A single feed entry (Atom `<entry>`, RSS `<item>`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Entry {
    pub metadata: Metadata,
    pub content: Option<Content>,
    pub published_at: Option<Timestamp>,
    pub summary: Option<Text>,
    pub source: Option<Source>,
    /// RSS 2.0 `<comments>` pass-through; Atom has no counterpart.
    pub comments: Option<String>,
}

/// A complete parsed feed document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Feed {
    pub metadata: Metadata,
    pub entries: Vec<Entry>,
}

/// RSS 2.0 crawl-scheduling metadata, kept apart from the canonical feed.
///
/// Each field holds the raw element text and is present only when the
/// corresponding element existed in the channel. Atom documents produce no
/// crawl hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CrawlHints {
    pub last_build_date: Option<String>,
    pub ttl: Option<String>,
    pub skip_hours: Option<String>,
    pub skip_minutes: Option<String>,
    pub skip_days: Option<String>,
}

impl CrawlHints {
    /// `true` when the channel carried no scheduling elements at all.
    pub fn is_empty(&self) -> bool {
        self.last_build_date.is_none()
            && self.ttl.is_none()
            && self.skip_hours.is_none()
            && self.skip_minutes.is_none()
            && self.skip_days.is_none()
    }
}
