//! docstypo3
//!
//! Turns configuration strings with embedded URLs into a sequence of plain
//! text and link tokens, and fills `|cfg_*|` substitutions in documents from
//! project metadata.

pub mod assembler;
pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod references;
pub mod renderer;
pub mod settings;
pub mod substitutions;

pub use assembler::{assemble, replacements_from_text, Replacement, Token};
pub use chunker::{scan, Chunk, Chunks};
pub use config::ProjectConfig;
pub use document::{Document, MessageLevel, Node, Reference, SystemMessage};
pub use error::{DocsError, Result};
pub use parser::{parse_string, parse_string_with, Parser};
pub use references::collect_hrefs;
pub use renderer::HtmlRenderer;
pub use settings::{ParserSettings, SettingValue};
pub use substitutions::{resolve_name, Substitutions, SubstitutionTransform, Variant};
