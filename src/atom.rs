//! Atom 1.0 parsing. The format is specified in RFC 4287.
//!
//! Translation is a recursive descent over the decoded element tree: a
//! shared meta-data composition pass handles the fields common to feeds,
//! entries, and nested sources, dispatching each recognized child to its
//! construct parser with the effective base URI in force at that point.
//! Singular elements may occur at most once; plural elements collect in
//! document order. Unrecognized elements and attributes are ignored —
//! deliberate forward compatibility, not an oversight.
//!
//! Text constructs with an `xhtml` content model yield an empty value; the
//! xhtml tree is not decoded.

use chrono::{DateTime, FixedOffset};

use crate::base::{effective_base, join_uri};
use crate::error::ParseError;
use crate::model::{
    Category, Content, CrawlHints, Entry, Feed, Generator, Link, Metadata, Person, Text, TextKind,
    Timestamp,
};
use crate::xml::{decode, Element};

/// The XML namespace for the Atom format.
pub const XMLNS_ATOM: &str = "http://www.w3.org/2005/Atom";

/// Parses an Atom 1.0 document into the canonical feed graph.
///
/// # Arguments
///
/// * `xml` - the Atom document text
/// * `feed_url` - the URL the document was retrieved from; it becomes the
///   base for relative references wherever no `xml:base` attribute is in
///   force, and the fallback feed id
/// * `include_entries` - whether to parse `<entry>` children; pass `false`
///   when only the feed-level metadata is needed (nested `<source>`
///   resolution does this)
///
/// # Returns
///
/// The feed paired with its crawl hints. Atom defines no crawl-scheduling
/// hints, so the second element is always `None`.
///
/// # Errors
///
/// * [`ParseError::MalformedDocument`] - the input is not well-formed XML
/// * [`ParseError::Multiplicity`] - a singular element occurred twice
/// * [`ParseError::DateFormat`] - a date construct held invalid RFC 3339
pub fn parse_atom(
    xml: &str,
    feed_url: Option<&str>,
    include_entries: bool,
) -> Result<(Feed, Option<CrawlHints>), ParseError> {
    let root = decode(xml)?;
    let feed = parse_feed_element(&root, feed_url, include_entries)?;
    Ok((feed, None))
}

/// Translates a decoded `<feed>` element.
///
/// Entry parsing is a separate pass from meta-data composition: entries are
/// not meta-data of the feed.
pub(crate) fn parse_feed_element(
    element: &Element,
    retrieval_url: Option<&str>,
    include_entries: bool,
) -> Result<Feed, ParseError> {
    let metadata = compose_metadata(element, retrieval_url)?;
    let mut entries = Vec::new();
    if include_entries {
        let base = effective_base(element, retrieval_url);
        for child in element.children_named(Some(XMLNS_ATOM), "entry") {
            entries.push(parse_entry_element(child, base)?);
        }
    }
    Ok(Feed { metadata, entries })
}

fn parse_entry_element(element: &Element, inherited_base: Option<&str>) -> Result<Entry, ParseError> {
    let metadata = compose_metadata(element, inherited_base)?;
    let base = effective_base(element, inherited_base);

    let mut content = None;
    let mut published_at = None;
    let mut summary = None;
    let mut source = None;
    for child in &element.children {
        if child.name.namespace.as_deref() != Some(XMLNS_ATOM) {
            continue;
        }
        match child.name.local.as_str() {
            "content" => set_once(&mut content, child, || Ok(parse_content(child, base)))?,
            "published" => set_once(&mut published_at, child, || {
                Ok(Timestamp::Rfc3339(parse_date_construct(child)?))
            })?,
            "summary" => set_once(&mut summary, child, || Ok(parse_text_construct(child)))?,
            // a nested source is a full meta-data composition of its own
            "source" => set_once(&mut source, child, || compose_metadata(child, base))?,
            _ => {}
        }
    }

    Ok(Entry {
        metadata,
        content,
        published_at,
        summary,
        source,
        comments: None,
    })
}

/// Accumulates the fields shared by feed, entry, and source elements.
#[derive(Default)]
struct MetadataBuilder {
    id: Option<String>,
    title: Option<Text>,
    updated_at: Option<Timestamp>,
    authors: Vec<Person>,
    categories: Vec<Category>,
    contributors: Vec<Person>,
    links: Vec<Link>,
    generator: Option<Generator>,
    icon: Option<String>,
    logo: Option<String>,
    rights: Option<Text>,
    subtitle: Option<Text>,
}

impl MetadataBuilder {
    /// Finalizes into an immutable value. A missing `<id>` falls back to
    /// the effective base URI.
    fn finish(self, base: Option<&str>) -> Metadata {
        Metadata {
            id: self.id.or_else(|| base.map(str::to_string)),
            title: self.title,
            updated_at: self.updated_at,
            authors: self.authors,
            categories: self.categories,
            contributors: self.contributors,
            links: self.links,
            generator: self.generator,
            icon: self.icon,
            logo: self.logo,
            rights: self.rights,
            subtitle: self.subtitle,
        }
    }
}

/// One dispatch pass over direct children, shared by all three root kinds.
pub(crate) fn compose_metadata(
    element: &Element,
    inherited_base: Option<&str>,
) -> Result<Metadata, ParseError> {
    let base = effective_base(element, inherited_base);
    let mut builder = MetadataBuilder::default();

    for child in &element.children {
        if child.name.namespace.as_deref() != Some(XMLNS_ATOM) {
            continue;
        }
        match child.name.local.as_str() {
            "id" => set_once(&mut builder.id, child, || Ok(parse_uri_content(child, base)))?,
            "title" => set_once(&mut builder.title, child, || Ok(parse_text_construct(child)))?,
            "updated" => set_once(&mut builder.updated_at, child, || {
                Ok(Timestamp::Rfc3339(parse_date_construct(child)?))
            })?,
            "author" => builder.authors.push(parse_person_construct(child, base)),
            "category" => {
                // a category without a term contributes nothing
                if let Some(category) = parse_category(child) {
                    builder.categories.push(category);
                }
            }
            "contributor" => builder
                .contributors
                .push(parse_person_construct(child, base)),
            "link" => builder.links.push(parse_link(child, base)),
            "generator" => set_once(&mut builder.generator, child, || {
                Ok(parse_generator(child, base))
            })?,
            "icon" => set_once(&mut builder.icon, child, || Ok(parse_uri_content(child, base)))?,
            "logo" => set_once(&mut builder.logo, child, || Ok(parse_uri_content(child, base)))?,
            "rights" => set_once(&mut builder.rights, child, || Ok(parse_text_construct(child)))?,
            "subtitle" => set_once(&mut builder.subtitle, child, || {
                Ok(parse_text_construct(child))
            })?,
            _ => {}
        }
    }

    Ok(builder.finish(base))
}

/// Fills a singular slot, failing if the element already occurred.
fn set_once<T>(
    slot: &mut Option<T>,
    element: &Element,
    parse: impl FnOnce() -> Result<T, ParseError>,
) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::Multiplicity {
            element: element.name.qualified(),
        });
    }
    *slot = Some(parse()?);
    Ok(())
}

fn parse_text_construct(element: &Element) -> Text {
    let type_attr = element.attribute("type");
    let kind = match type_attr {
        None | Some("text") => TextKind::Text,
        Some("html") => TextKind::Html,
        Some("xhtml") => TextKind::Xhtml,
        Some(other) => {
            tracing::debug!(value = %other, "Unrecognized text construct type");
            TextKind::Text
        }
    };
    let value = match type_attr {
        None | Some("text") | Some("html") => element.text.clone(),
        // xhtml (and anything else) stays empty
        _ => String::new(),
    };
    Text { kind, value }
}

fn parse_person_construct(element: &Element, inherited_base: Option<&str>) -> Person {
    let base = effective_base(element, inherited_base);
    let mut person = Person::default();
    for child in &element.children {
        if child.name.namespace.as_deref() != Some(XMLNS_ATOM) {
            continue;
        }
        match child.name.local.as_str() {
            "name" => person.name = Some(child.text.clone()),
            "uri" => {
                let child_base = effective_base(child, base);
                person.uri = Some(join_uri(child_base, &child.text));
            }
            "email" => person.email = Some(child.text.clone()),
            _ => {}
        }
    }
    person
}

fn parse_date_construct(element: &Element) -> Result<DateTime<FixedOffset>, ParseError> {
    let text = element.text.trim();
    DateTime::parse_from_rfc3339(text).map_err(|source| ParseError::DateFormat {
        value: text.to_string(),
        source,
    })
}

fn parse_link(element: &Element, inherited_base: Option<&str>) -> Link {
    let base = effective_base(element, inherited_base);
    Link {
        // a missing href yields an empty, unresolved URI rather than failing
        uri: element
            .attribute("href")
            .map(|href| join_uri(base, href))
            .unwrap_or_default(),
        relation: element.attribute("rel").map(str::to_string),
        mimetype: element.attribute("type").map(str::to_string),
        language: element.attribute("hreflang").map(str::to_string),
        title: element.attribute("title").map(str::to_string),
        byte_size: element.attribute("length").map(str::to_string),
    }
}

fn parse_category(element: &Element) -> Option<Category> {
    let term = element.attribute("term").filter(|term| !term.is_empty())?;
    Some(Category {
        term: term.to_string(),
        scheme_uri: element.attribute("scheme").map(str::to_string),
        label: element.attribute("label").map(str::to_string),
    })
}

fn parse_generator(element: &Element, inherited_base: Option<&str>) -> Generator {
    let base = effective_base(element, inherited_base);
    Generator {
        value: element.text.clone(),
        uri: element.attribute("uri").map(|uri| join_uri(base, uri)),
        version: element.attribute("version").map(str::to_string),
    }
}

fn parse_content(element: &Element, inherited_base: Option<&str>) -> Content {
    let base = effective_base(element, inherited_base);
    Content {
        value: element.text.clone(),
        kind: element.attribute("type").unwrap_or("text").to_string(),
        source_uri: element.attribute("src").map(|src| join_uri(base, src)),
    }
}

/// Elements whose text content is itself a URI (`id`, `icon`, `logo`).
fn parse_uri_content(element: &Element, inherited_base: Option<&str>) -> String {
    let base = effective_base(element, inherited_base);
    join_uri(base, element.text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(xml: &str) -> Element {
        decode(xml).expect("test fixture must be well-formed")
    }

    #[test]
    fn test_text_construct_default_type() {
        let text = parse_text_construct(&element("<title>Example</title>"));
        assert_eq!(text.kind, TextKind::Text);
        assert_eq!(text.value, "Example");
    }

    #[test]
    fn test_text_construct_html() {
        let text = parse_text_construct(&element(
            r#"<title type="html">&lt;b&gt;bold&lt;/b&gt;</title>"#,
        ));
        assert_eq!(text.kind, TextKind::Html);
        // raw text, no HTML handling beyond XML entity decoding
        assert_eq!(text.value, "<b>bold</b>");
    }

    #[test]
    fn test_text_construct_xhtml_is_empty() {
        let text = parse_text_construct(&element(
            r#"<title type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">x</div></title>"#,
        ));
        assert_eq!(text.kind, TextKind::Xhtml);
        assert_eq!(text.value, "");
    }

    #[test]
    fn test_person_construct_fields() {
        let person = parse_person_construct(
            &element(
                r#"<author xmlns="http://www.w3.org/2005/Atom">
                     <name>John Doe</name>
                     <uri>about</uri>
                     <email>john@example.com</email>
                     <unknown>ignored</unknown>
                   </author>"#,
            ),
            Some("http://ex.com/people/"),
        );
        assert_eq!(person.name.as_deref(), Some("John Doe"));
        assert_eq!(person.uri.as_deref(), Some("http://ex.com/people/about"));
        assert_eq!(person.email.as_deref(), Some("john@example.com"));
    }

    #[test]
    fn test_person_construct_all_fields_optional() {
        let person = parse_person_construct(
            &element(r#"<author xmlns="http://www.w3.org/2005/Atom"/>"#),
            None,
        );
        assert_eq!(person, Person::default());
    }

    #[test]
    fn test_date_construct_valid() {
        let parsed = parse_date_construct(&element("<updated>2024-01-01T00:00:00Z</updated>"))
            .expect("valid RFC 3339 must parse");
        assert_eq!(
            parsed,
            DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_date_construct_with_offset() {
        let parsed = parse_date_construct(&element(
            "<published>2013-08-10T15:27:04+09:00</published>",
        ))
        .expect("offset timestamps must parse");
        assert_eq!(parsed.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_date_construct_malformed_fails() {
        let result = parse_date_construct(&element("<updated>Sat, 18 Jun 2005</updated>"));
        assert!(matches!(result, Err(ParseError::DateFormat { .. })));
    }

    #[test]
    fn test_link_maps_attributes() {
        let link = parse_link(
            &element(
                r#"<link href="/a" rel="alternate" type="text/html"
                        hreflang="en" title="Home" length="1234"/>"#,
            ),
            Some("http://ex.com/"),
        );
        assert_eq!(link.uri, "http://ex.com/a");
        assert_eq!(link.relation.as_deref(), Some("alternate"));
        assert_eq!(link.mimetype.as_deref(), Some("text/html"));
        assert_eq!(link.language.as_deref(), Some("en"));
        assert_eq!(link.title.as_deref(), Some("Home"));
        assert_eq!(link.byte_size.as_deref(), Some("1234"));
    }

    #[test]
    fn test_link_without_href_yields_empty_uri() {
        let link = parse_link(&element(r#"<link rel="self"/>"#), Some("http://ex.com/"));
        assert_eq!(link.uri, "");
        assert_eq!(link.relation.as_deref(), Some("self"));
    }

    #[test]
    fn test_category_requires_term() {
        assert_eq!(parse_category(&element(r#"<category label="x"/>"#)), None);
        assert_eq!(parse_category(&element(r#"<category term=""/>"#)), None);
        let category =
            parse_category(&element(r#"<category term="tech" scheme="http://s/" label="Tech"/>"#))
                .expect("term present");
        assert_eq!(category.term, "tech");
        assert_eq!(category.scheme_uri.as_deref(), Some("http://s/"));
        assert_eq!(category.label.as_deref(), Some("Tech"));
    }

    #[test]
    fn test_generator_resolves_uri() {
        let generator = parse_generator(
            &element(r#"<generator uri="gen" version="1.0">Earth Reader</generator>"#),
            Some("http://ex.com/"),
        );
        assert_eq!(generator.value, "Earth Reader");
        assert_eq!(generator.uri.as_deref(), Some("http://ex.com/gen"));
        assert_eq!(generator.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_content_src_resolved_only_when_present() {
        let inline = parse_content(&element("<content>body</content>"), Some("http://ex.com/"));
        assert_eq!(inline.value, "body");
        assert_eq!(inline.kind, "text");
        assert_eq!(inline.source_uri, None);

        let out_of_line = parse_content(
            &element(r#"<content type="video/mpeg4" src="movie.mp4"/>"#),
            Some("http://ex.com/"),
        );
        assert_eq!(out_of_line.kind, "video/mpeg4");
        assert_eq!(
            out_of_line.source_uri.as_deref(),
            Some("http://ex.com/movie.mp4")
        );
    }

    #[test]
    fn test_metadata_id_falls_back_to_base() {
        let feed = element(r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#);
        let metadata = compose_metadata(&feed, Some("http://ex.com/feed.xml")).unwrap();
        assert_eq!(metadata.id.as_deref(), Some("http://ex.com/feed.xml"));

        let metadata = compose_metadata(&feed, None).unwrap();
        assert_eq!(metadata.id, None);
    }
}
