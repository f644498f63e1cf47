//! Collects the raw text of every hyperlink in a parsed document.

use crate::document::{Document, Node};

/// Raw source of every hyperlink node, in document order.
///
/// Duplicates are kept: the chunker matches these strings positionally
/// against the text they were parsed from.
pub fn collect_hrefs(document: &Document) -> Vec<String> {
    document
        .traverse()
        .filter_map(|node| match node {
            Node::Reference(reference) => Some(reference.rawsource.clone()),
            _ => None,
        })
        .collect()
}
