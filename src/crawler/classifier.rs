//! Resource classification
//!
//! The recruiting API does not mark file descriptors with a media type, so the
//! only reliable signal is the pair of fields every descriptor carries: a
//! document type and a file name. This module is the single place that rule
//! lives.

use serde_json::Value;

/// Marker field present on attachment descriptors
pub const DOCUMENT_TYPE_KEY: &str = "document_type";

/// File name field present on attachment descriptors
pub const FILE_NAME_KEY: &str = "file_name";

/// Field holding a resource's outgoing links
pub const LINKS_KEY: &str = "links";

/// Relation name of the link that serves an attachment's bytes
pub const DOWNLOAD_REL: &str = "Download";

/// One outgoing link of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Relation name; empty when the source omitted it
    pub rel: String,
    /// Target URL; `None` when missing or empty
    pub href: Option<String>,
}

/// What the walker should do with a fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A file descriptor: download its payload, never recurse
    Attachment {
        file_name: String,
        /// The `Download` link, if the descriptor has one with an href
        download: Option<Link>,
    },
    /// A resource with related resources to recurse into, in source order
    Container { links: Vec<Link> },
    /// Nothing further to do
    Leaf,
}

/// Extracts the ordered outgoing links of a resource
///
/// Entries of the `links` array that are not objects are ignored. A missing
/// `rel` becomes an empty string; a missing or empty `href` becomes `None`.
pub fn extract_links(node: &Value) -> Vec<Link> {
    let Some(links) = node.get(LINKS_KEY).and_then(Value::as_array) else {
        return Vec::new();
    };

    links
        .iter()
        .filter_map(Value::as_object)
        .map(|link| Link {
            rel: link
                .get("rel")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            href: link
                .get("href")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(str::to_string),
        })
        .collect()
}

/// Returns true when the resource carries both attachment markers
pub fn is_attachment(node: &Value) -> bool {
    node.as_object().map_or(false, |object| {
        object.contains_key(DOCUMENT_TYPE_KEY) && object.contains_key(FILE_NAME_KEY)
    })
}

/// Classifies a fetched resource
///
/// # Rules
///
/// | Resource | Kind |
/// |----------|------|
/// | has `document_type` and `file_name` | Attachment |
/// | otherwise, non-empty `links` | Container |
/// | anything else (incl. non-objects) | Leaf |
pub fn classify(node: &Value) -> NodeKind {
    if is_attachment(node) {
        let file_name = match node.get(FILE_NAME_KEY) {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        };

        let download = extract_links(node)
            .into_iter()
            .find(|link| link.rel == DOWNLOAD_REL && link.href.is_some());

        return NodeKind::Attachment {
            file_name,
            download,
        };
    }

    let links = extract_links(node);
    if links.is_empty() {
        NodeKind::Leaf
    } else {
        NodeKind::Container { links }
    }
}
