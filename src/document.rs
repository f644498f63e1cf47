//! Document tree produced by the minimal markup parser.

use serde::Serialize;
use std::fmt;

/// Severity of a system message, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Severe = 4,
}

impl MessageLevel {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLevel::Debug => write!(f, "DEBUG"),
            MessageLevel::Info => write!(f, "INFO"),
            MessageLevel::Warning => write!(f, "WARNING"),
            MessageLevel::Error => write!(f, "ERROR"),
            MessageLevel::Severe => write!(f, "SEVERE"),
        }
    }
}

/// A diagnostic raised while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMessage {
    pub level: MessageLevel,
    pub message: String,
    pub line: usize,
}

impl fmt::Display for SystemMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<string>:{}: ({}) {}", self.line, self.level, self.message)
    }
}

/// A hyperlink node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Source text exactly as it appeared in the input.
    pub rawsource: String,
    /// Display text.
    pub text: String,
    pub refuri: Option<String>,
    /// Normalized name for references that resolve through a target.
    pub refname: Option<String>,
    pub anonymous: bool,
}

impl Reference {
    /// A link whose text, source and target are all the same URI.
    pub fn standalone(uri: &str) -> Self {
        Self {
            rawsource: uri.to_string(),
            text: uri.to_string(),
            refuri: Some(uri.to_string()),
            refname: None,
            anonymous: false,
        }
    }

    pub fn external(rawsource: &str, text: &str, refuri: &str) -> Self {
        Self {
            rawsource: rawsource.to_string(),
            text: text.to_string(),
            refuri: Some(refuri.to_string()),
            refname: None,
            anonymous: false,
        }
    }
}

/// Block and inline nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Paragraph {
        children: Vec<Node>,
        line: usize,
    },
    Title {
        children: Vec<Node>,
        level: usize,
        line: usize,
    },
    BlockQuote {
        children: Vec<Node>,
        line: usize,
    },
    LiteralBlock {
        content: String,
        line: usize,
    },
    Raw {
        format: String,
        content: String,
        line: usize,
    },
    Comment {
        content: String,
        line: usize,
    },
    /// Hyperlink target such as `.. _name: https://example.org`.
    Target {
        name: String,
        refuri: Option<String>,
        line: usize,
    },
    SubstitutionDefinition {
        name: String,
        children: Vec<Node>,
        line: usize,
    },
    Text {
        text: String,
    },
    Emphasis {
        text: String,
    },
    Strong {
        text: String,
    },
    Literal {
        text: String,
    },
    /// Interpreted text, optionally with an explicit role prefix.
    Interpreted {
        role: Option<String>,
        text: String,
    },
    Reference(Reference),
    SubstitutionReference {
        refname: String,
        rawsource: String,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// Child nodes, for node kinds that have any.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children, .. }
            | Node::Title { children, .. }
            | Node::BlockQuote { children, .. }
            | Node::SubstitutionDefinition { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children, .. }
            | Node::Title { children, .. }
            | Node::BlockQuote { children, .. }
            | Node::SubstitutionDefinition { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Visible text of this node and its descendants.
    pub fn as_text(&self) -> String {
        match self {
            Node::Text { text }
            | Node::Emphasis { text }
            | Node::Strong { text }
            | Node::Literal { text }
            | Node::Interpreted { text, .. } => text.clone(),
            Node::Reference(reference) => reference.text.clone(),
            Node::SubstitutionReference { rawsource, .. } => rawsource.clone(),
            Node::LiteralBlock { content, .. } | Node::Raw { content, .. } => content.clone(),
            Node::Comment { .. } | Node::Target { .. } => String::new(),
            _ => self.children().iter().map(Node::as_text).collect(),
        }
    }
}

/// Root of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Name of the input source.
    pub source: String,
    pub children: Vec<Node>,
    pub messages: Vec<SystemMessage>,
}

impl Document {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            children: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Walk every node depth-first in document order.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Names of all substitution definitions in the document.
    pub fn substitution_names(&self) -> Vec<&str> {
        self.traverse()
            .filter_map(|node| match node {
                Node::SubstitutionDefinition { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Visible text of the whole document, blocks separated by blank lines.
    pub fn as_text(&self) -> String {
        self.children
            .iter()
            .map(Node::as_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Pre-order iterator over a document tree.
pub struct Traverse<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
