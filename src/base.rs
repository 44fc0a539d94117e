//! Effective base URI computation and base-relative joining.
//!
//! Every parse call threads an inherited base URI down the element tree:
//! an element's own `xml:base` attribute wins, otherwise the nearest
//! ancestor's base applies, falling back to the retrieval URL of the whole
//! document. The value is threaded through call arguments, never stored
//! globally.

use url::Url;

use crate::xml::Element;

/// The XML namespace for the predefined `xml:` prefix.
pub const XMLNS_XML: &str = "http://www.w3.org/XML/1998/namespace";

/// The base URI in force for `element` and its descendants.
///
/// The element's own `xml:base` attribute takes precedence; otherwise the
/// inherited value is returned unchanged. `None` means no base is in force
/// anywhere up the chain.
pub fn effective_base<'a>(element: &'a Element, inherited: Option<&'a str>) -> Option<&'a str> {
    element.attribute_ns(XMLNS_XML, "base").or(inherited)
}

/// Resolves `reference` against `base`.
///
/// With no base, or a base that is not an absolute URI, the reference is
/// returned unchanged — relative references stay unresolved rather than
/// failing the parse.
pub fn join_uri(base: Option<&str>, reference: &str) -> String {
    let base = match base.filter(|value| !value.is_empty()) {
        Some(base) => base,
        None => return reference.to_string(),
    };
    match Url::parse(base).and_then(|base| base.join(reference)) {
        Ok(joined) => joined.to_string(),
        Err(error) => {
            tracing::debug!(base = %base, reference = %reference, error = %error,
                "Base URI join failed, keeping reference unresolved");
            reference.to_string()
        }
    }
}
