//! Citation extraction from upstream annotation records.
//!
//! Upstream responses attach a list of annotations to the assistant
//! message. Records arrive in two shapes: well-formed structured records
//! and loosely-typed JSON mappings whose fields may be missing or of the
//! wrong type. Both are normalized by a single adapter into one internal
//! record before any citation logic looks at them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminant identifying an annotation as a URL citation.
pub const URL_CITATION: &str = "url_citation";

/// A cited source returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Source URL.
    pub url: String,
    /// Source title; the URL when the upstream supplied none.
    pub title: String,
}

/// An annotation record as received from the upstream.
///
/// Deserialization never fails for a JSON value: anything that does not
/// match the structured shape lands in [`RawAnnotation::Loose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnnotation {
    /// Structured record with a string discriminant and well-typed payload.
    Typed(TypedAnnotation),
    /// Any other JSON value, inspected field by field.
    Loose(Value),
}

/// Structured annotation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedAnnotation {
    /// Annotation kind, e.g. `"url_citation"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// URL citation payload, present for `url_citation` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_citation: Option<UrlCitation>,
}

/// Structured `url_citation` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCitation {
    /// Cited URL.
    #[serde(default)]
    pub url: String,
    /// Page title, if the upstream provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Normalized form shared by both annotation shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CitationSource<'a> {
    kind: Option<&'a str>,
    url: &'a str,
    title: Option<&'a str>,
}

impl RawAnnotation {
    /// Adapts either external shape into one internal record.
    fn citation_source(&self) -> CitationSource<'_> {
        match self {
            Self::Typed(annotation) => {
                let payload = annotation.url_citation.as_ref();
                CitationSource {
                    kind: Some(annotation.kind.as_str()),
                    url: payload.map_or("", |p| p.url.as_str()),
                    title: payload.and_then(|p| p.title.as_deref()),
                }
            }
            Self::Loose(value) => {
                let payload = value.get(URL_CITATION);
                CitationSource {
                    kind: value.get("type").and_then(Value::as_str),
                    url: payload
                        .and_then(|p| p.get("url"))
                        .and_then(Value::as_str)
                        .unwrap_or(""),
                    title: payload.and_then(|p| p.get("title")).and_then(Value::as_str),
                }
            }
        }
    }

    /// Returns the citation this record describes, if any.
    pub fn to_citation(&self) -> Option<Citation> {
        let source = self.citation_source();
        if source.kind != Some(URL_CITATION) || source.url.is_empty() {
            return None;
        }

        let title = source
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or(source.url);

        Some(Citation {
            url: source.url.to_string(),
            title: title.to_string(),
        })
    }
}

/// Extracts URL citations from an annotation list, preserving order.
///
/// The answer text is accepted alongside the annotations but is not
/// inspected. Records that are not URL citations, or whose URL resolves
/// to an empty string, are skipped.
pub fn extract_citations(_content: &str, annotations: Option<&[RawAnnotation]>) -> Vec<Citation> {
    annotations
        .unwrap_or_default()
        .iter()
        .filter_map(RawAnnotation::to_citation)
        .collect()
}
