//! `|cfg_*|` substitutions filled from the project configuration.
//!
//! A document may reference project metadata as `|cfg_project|`,
//! `|cfg_author|` and so on. References the document does not define
//! itself are replaced by the configured value. A postfix on the name picks
//! how the value is rendered:
//!
//! | name              | output                                   |
//! |-------------------|------------------------------------------|
//! | `cfg_author`      | the value as text                        |
//! | `cfg_author_r`    | the value as a quoted literal            |
//! | `cfg_author_json` | the value encoded as a JSON string       |
//! | `cfg_author_linked` | the value with its URLs turned into links |

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

use crate::assembler::replacements_from_text;
use crate::config::ProjectConfig;
use crate::document::{Document, Node};

/// Substitution names handled without a definition in the document.
pub const SUBSTITUTION_KEYS: [&str; 9] = [
    "cfg_audience",
    "cfg_author",
    "cfg_copyright",
    "cfg_description",
    "cfg_language",
    "cfg_license",
    "cfg_project",
    "cfg_release",
    "cfg_version",
];

const KEY_PREFIX: &str = "cfg_";

/// How a substituted value is turned into nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Plain,
    Raw,
    Json,
    Linked,
}

impl Variant {
    const SUFFIXES: [(&'static str, Variant); 3] = [
        ("_linked", Variant::Linked),
        ("_json", Variant::Json),
        ("_r", Variant::Raw),
    ];

    /// Render `value` as inline nodes.
    pub fn format(self, value: &str) -> Vec<Node> {
        match self {
            Variant::Plain => vec![Node::text(value)],
            Variant::Raw => vec![Node::text(format!("{:?}", value))],
            Variant::Json => vec![Node::text(
                serde_json::Value::String(value.to_string()).to_string(),
            )],
            Variant::Linked => {
                let replacement = replacements_from_text(value);
                if replacement.healthy {
                    replacement.into_nodes()
                } else {
                    warn!(
                        "Could not attach every link in {:?}, using plain text instead",
                        value
                    );
                    vec![Node::text(value)]
                }
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Plain => write!(f, "plain"),
            Variant::Raw => write!(f, "raw"),
            Variant::Json => write!(f, "json"),
            Variant::Linked => write!(f, "linked"),
        }
    }
}

/// Split a substitution name into its key and formatting variant.
///
/// Returns `None` for names that are not handled here.
pub fn resolve_name(name: &str) -> Option<(&'static str, Variant)> {
    if let Some(key) = SUBSTITUTION_KEYS.iter().find(|key| **key == name) {
        return Some((*key, Variant::Plain));
    }
    Variant::SUFFIXES.iter().find_map(|(suffix, variant)| {
        let base = name.strip_suffix(suffix)?;
        SUBSTITUTION_KEYS
            .iter()
            .find(|key| **key == base)
            .map(|key| (*key, *variant))
    })
}

/// Values for every substitution key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Substitutions {
    values: IndexMap<&'static str, String>,
}

impl Substitutions {
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut values = IndexMap::new();
        for key in SUBSTITUTION_KEYS {
            let name = &key[KEY_PREFIX.len()..];
            let mut value = config.value(name).unwrap_or_default().to_string();
            if value.is_empty() && name == "author" {
                value = config.t3author.clone();
            }
            values.insert(key, value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

/// Replaces handled substitution references in a document.
#[derive(Debug, Clone)]
pub struct SubstitutionTransform {
    substitutions: Substitutions,
}

impl SubstitutionTransform {
    pub fn new(substitutions: Substitutions) -> Self {
        Self { substitutions }
    }

    /// Replace every handled reference; returns how many were replaced.
    ///
    /// Names the document defines itself are left for the document's own
    /// definitions.
    pub fn apply(&self, document: &mut Document) -> usize {
        let defined: HashSet<String> = document
            .substitution_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let replaced = self.replace_in(&mut document.children, &defined);
        debug!("Replaced {} configuration substitutions", replaced);
        replaced
    }

    fn replace_in(&self, nodes: &mut Vec<Node>, defined: &HashSet<String>) -> usize {
        let mut replaced = 0;

        for mut node in std::mem::take(nodes) {
            if let Node::SubstitutionReference { refname, .. } = &node {
                if !defined.contains(refname) {
                    if let Some((key, variant)) = resolve_name(refname) {
                        let value = self.substitutions.get(key).unwrap_or_default();
                        nodes.extend(variant.format(value));
                        replaced += 1;
                        continue;
                    }
                }
            }

            if let Some(children) = node.children_mut() {
                replaced += self.replace_in(children, defined);
            }
            nodes.push(node);
        }

        replaced
    }
}
