//! XML decoding into a navigable element tree.
//!
//! The translators in [`crate::atom`] and [`crate::rss2`] are
//! recursive-descent walkers over whole documents, so decoding builds an
//! owned tree up front: qualified element names, attributes, direct children
//! in document order, and concatenated direct text. Namespaces are resolved
//! to URIs — matching is never done on prefixes.
//!
//! XXE safety: `quick-xml` (0.37) never parses `<!ENTITY>` declarations.
//! Only the five XML builtin entities resolve; anything else is a parse
//! error, so document content can never expand from a DOCTYPE.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::ParseError;

/// Maximum allowed element nesting depth. Prevents stack exhaustion in the
/// recursive-descent walkers from maliciously nested documents.
const MAX_ELEMENT_DEPTH: usize = 128;

/// A namespace-qualified element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    /// Namespace URI the name is bound to, if any. Unprefixed attributes
    /// are never in a namespace.
    pub namespace: Option<String>,
    pub local: String,
}

impl Name {
    /// The fully-qualified form, `{namespace-uri}local`, used in error
    /// messages.
    pub fn qualified(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.local),
            None => self.local.clone(),
        }
    }
}

/// One decoded XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: Name,
    pub attributes: Vec<(Name, String)>,
    pub children: Vec<Element>,
    /// Concatenated direct text and CDATA content, entity-decoded.
    pub text: String,
}

impl Element {
    /// `true` when the element's name matches the given namespace URI and
    /// local name.
    pub fn is_named(&self, namespace: Option<&str>, local: &str) -> bool {
        self.name.namespace.as_deref() == namespace && self.name.local == local
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.namespace.is_none() && name.local == local)
            .map(|(_, value)| value.as_str())
    }

    /// Value of a namespace-qualified attribute.
    pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.namespace.as_deref() == Some(namespace) && name.local == local)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children matching the given namespace URI and local name, in
    /// document order.
    pub fn children_named<'a>(
        &'a self,
        namespace: Option<&'a str>,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.children
            .iter()
            .filter(move |child| child.is_named(namespace, local))
    }
}

/// Decodes an XML document into its root element.
///
/// # Errors
///
/// Returns [`ParseError::MalformedDocument`] if the input is not
/// well-formed XML, has no root element, has more than one root element, or
/// nests deeper than the safety limit.
pub fn decode(xml: &str) -> Result<Element, ParseError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolve, event) = reader.read_resolved_event().map_err(malformed)?;
        let namespace = namespace_of(resolve);
        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(ParseError::MalformedDocument(format!(
                        "element nesting exceeds maximum depth of {}",
                        MAX_ELEMENT_DEPTH
                    )));
                }
                let element = open_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, namespace, &start)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::MalformedDocument("unexpected closing tag".into()))?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape().map_err(malformed)?);
                }
            }
            Event::CData(cdata) => {
                if let Some(open) = stack.last_mut() {
                    let raw = cdata.into_inner();
                    let decoded = reader.decoder().decode(&raw).map_err(malformed)?;
                    open.text.push_str(&decoded);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, DOCTYPE
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::MalformedDocument(
            "unexpected end of document inside an open element".into(),
        ));
    }
    root.ok_or_else(|| ParseError::MalformedDocument("document has no root element".into()))
}

fn malformed(error: impl std::fmt::Display) -> ParseError {
    ParseError::MalformedDocument(error.to_string())
}

fn namespace_of(resolve: ResolveResult<'_>) -> Option<String> {
    match resolve {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.into_inner()).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<Element, ParseError> {
    let local = String::from_utf8_lossy(start.local_name().into_inner()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(error) => {
                tracing::warn!(error = %error, "Skipping malformed attribute");
                continue;
            }
        };
        // xmlns declarations define scope; they are not data attributes
        if attr.key.as_ref() == b"xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
            continue;
        }
        let (resolve, attr_local) = reader.resolve_attribute(attr.key);
        let name = Name {
            namespace: namespace_of(resolve),
            local: String::from_utf8_lossy(attr_local.into_inner()).into_owned(),
        };
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(malformed)?
            .into_owned();
        attributes.push((name, value));
    }

    Ok(Element {
        name: Name {
            namespace,
            local,
        },
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn close_element(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ParseError::MalformedDocument(
                "document has more than one root element".into(),
            ))
        }
    }
    Ok(())
}
