//! Turns chunks into text and link tokens ready for insertion into a
//! host document.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chunker::{scan, Chunk};
use crate::document::{Node, Reference};
use crate::parser::parse_string;
use crate::references::collect_hrefs;

/// A renderable piece of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Token {
    Text { text: String },
    Link { text: String, uri: String },
}

impl Token {
    pub fn text(text: impl Into<String>) -> Self {
        Token::Text { text: text.into() }
    }

    pub fn link(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Token::Link {
            text: text.into(),
            uri: uri.into(),
        }
    }

    /// The visible part of the token.
    pub fn display_text(&self) -> &str {
        match self {
            Token::Text { text } | Token::Link { text, .. } => text,
        }
    }

    /// Convert into a document node; links become external references.
    pub fn into_node(self) -> Node {
        match self {
            Token::Text { text } => Node::Text { text },
            Token::Link { text, uri } => Node::Reference(Reference {
                rawsource: text.clone(),
                text,
                refuri: Some(uri),
                refname: None,
                anonymous: false,
            }),
        }
    }
}

/// Tokens for one template plus the health of the scan that made them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub tokens: Vec<Token>,
    pub healthy: bool,
}

impl Replacement {
    /// The visible text, concatenated.
    pub fn display_text(&self) -> String {
        self.tokens.iter().map(Token::display_text).collect()
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.tokens.into_iter().map(Token::into_node).collect()
    }
}

/// Map chunks to tokens. Empty plain chunks produce nothing.
pub fn assemble<'a>(chunks: impl IntoIterator<Item = Chunk<'a>>) -> Replacement {
    let mut tokens = Vec::new();
    let mut healthy = true;

    for chunk in chunks {
        healthy = chunk.healthy;
        match chunk.link {
            Some(uri) => tokens.push(Token::link(chunk.span, uri)),
            None if !chunk.span.is_empty() => tokens.push(Token::text(chunk.span)),
            None => {}
        }
    }

    Replacement { tokens, healthy }
}

/// Parse `text` as markup, find its hyperlinks and rebuild it as tokens.
pub fn replacements_from_text(text: &str) -> Replacement {
    let document = parse_string(text);
    let hrefs = collect_hrefs(&document);
    let replacement = assemble(scan(text, &hrefs));

    debug!(
        "Linked {:?}: {} hrefs, {} tokens, healthy={}",
        text,
        hrefs.len(),
        replacement.tokens.len(),
        replacement.healthy
    );

    replacement
}
