//! Minimal reStructuredText parser.
//!
//! Just enough of the markup grammar to find hyperlinks and substitution
//! references in short strings such as configuration values. The parser is
//! driven by [`ParserSettings`] and never fails: problems are recorded as
//! system messages on the returned [`Document`].

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};

use crate::document::{Document, MessageLevel, Node, Reference, SystemMessage};
use crate::settings::ParserSettings;

/// URI schemes recognised in standalone hyperlinks.
const KNOWN_SCHEMES: &[&str] = &[
    "file", "ftp", "ftps", "git", "gopher", "http", "https", "irc", "ircs", "mailto", "news",
    "nntp", "sftp", "sip", "sips", "ssh", "svn", "tel", "telnet", "urn", "ws", "wss", "xmpp",
];

/// Characters allowed right before inline markup.
const START_CONTEXT: &str = "-:/'\"<([{\u{2018}\u{201c}\u{ab}\u{201a}\u{201e}";
/// Characters allowed right after inline markup.
const END_CONTEXT: &str = "-.,:;!?\\/'\")]}>\u{2019}\u{201d}\u{bb}";

/// Underline characters for section titles.
const TITLE_ADORNMENTS: &str = "=-~^\"'*+#<>`:._";

lazy_static! {
    static ref DIRECTIVE_REGEX: Regex = Regex::new(r"^\.\.\s+([\w-]+)::(?:\s+(.*?))?\s*$").unwrap();
    static ref TARGET_REGEX: Regex =
        Regex::new(r"^\.\.\s+_(_|`[^`]+`|[^:`\s][^:`]*):(?:\s+(.*?))?\s*$").unwrap();
    static ref SUBSTITUTION_DEF_REGEX: Regex =
        Regex::new(r"^\.\.\s+\|([^|\s](?:[^|]*[^|\s])?)\|\s+([\w-]+)::(?:\s+(.*?))?\s*$").unwrap();
    static ref INLINE_REGEX: Regex = Regex::new(&inline_pattern()).unwrap();
}

fn inline_pattern() -> String {
    let uric = r"[-_.!~*'()\[\];/:@&=+$,%a-zA-Z0-9]";
    let urilast = r"[_~*/=+a-zA-Z0-9]";
    let emailc = r"[-_!~*'{|}/#?^`&=+$%a-zA-Z0-9]";
    let host_label = r"[a-zA-Z0-9](?:[-a-zA-Z0-9]*[a-zA-Z0-9])?";

    [
        r"(?P<literal>``(?P<literal_body>[^`\s](?:[^`]*?[^`\s])?)``)".to_string(),
        concat!(
            r"(?P<interpreted>(?::(?P<role>[A-Za-z][\w.+:-]*):)?",
            r"`(?P<interpreted_body>[^`\s](?:[^`]*?[^`\s])?)`(?P<reference_suffix>__?)?)"
        )
        .to_string(),
        r"(?P<strong>\*\*(?P<strong_body>[^*\s](?:[^*]*?[^*\s])?)\*\*)".to_string(),
        r"(?P<emphasis>\*(?P<emphasis_body>[^*\s](?:[^*]*?[^*\s])?)\*)".to_string(),
        r"(?P<substitution>\|(?P<substitution_body>[^|\s](?:[^|]*?[^|\s])?)\|(?:__?)?)".to_string(),
        r"(?P<pep>PEP\s+(?P<pep_number>\d+))".to_string(),
        r"(?P<rfc>RFC[-\s]?(?P<rfc_number>\d+))".to_string(),
        format!(
            r"(?P<uri>(?P<scheme>[a-zA-Z][a-zA-Z0-9.+-]*):(?://)?{uric}*{urilast}(?:\?{uric}*{urilast})?(?:#{uric}*{urilast})?)"
        ),
        format!(r"(?P<email>{emailc}+(?:\.{emailc}+)*@{host_label}(?:\.{host_label})+)"),
        r"(?P<simple>(?P<simple_name>[\p{L}\p{N}]+(?:[-.+:][\p{L}\p{N}]+)*)(?P<simple_suffix>__?))"
            .to_string(),
    ]
    .join("|")
}

/// Parse a string with the default inert settings.
pub fn parse_string(input: &str) -> Document {
    let settings = ParserSettings::default();
    parse_string_with(input, &settings)
}

/// Parse a string with explicit settings.
pub fn parse_string_with(input: &str, settings: &ParserSettings) -> Document {
    Parser::new(settings).parse(input)
}

#[derive(Default)]
struct ParseState {
    messages: Vec<SystemMessage>,
    /// Underline characters in order of first use; the index is the level.
    title_styles: Vec<char>,
}

pub struct Parser<'s> {
    settings: &'s ParserSettings,
    character_level: bool,
    report_level: i64,
}

impl<'s> Parser<'s> {
    pub fn new(settings: &'s ParserSettings) -> Self {
        let report_level = if settings.flag("debug") {
            MessageLevel::Debug.as_i64()
        } else {
            settings
                .int("report_level")
                .unwrap_or(MessageLevel::Warning.as_i64())
        };

        Self {
            settings,
            character_level: settings.flag("character_level_inline_markup"),
            report_level,
        }
    }

    pub fn parse(&self, input: &str) -> Document {
        let mut document = Document::new("string");
        let mut state = ParseState::default();

        let tab_width = self.settings.tab_width();
        let lines: Vec<String> = input
            .lines()
            .map(|line| expand_tabs(line, tab_width))
            .collect();

        document.children = self.parse_blocks(&lines, 0, &mut state);
        document.messages = state.messages;

        debug!(
            "Parsed string document: {} top-level nodes, {} references, {} messages",
            document.children.len(),
            document
                .traverse()
                .filter(|node| matches!(node, Node::Reference(_)))
                .count(),
            document.messages.len()
        );

        document
    }

    fn report(&self, state: &mut ParseState, level: MessageLevel, message: String, line: usize) {
        let message = SystemMessage {
            level,
            message,
            line,
        };
        if level.as_i64() >= self.report_level {
            warn!("{}", message);
            state.messages.push(message);
        } else {
            debug!("{}", message);
        }
    }

    /// Parse a run of lines; `offset` is the zero-based source line of `lines[0]`.
    fn parse_blocks(&self, lines: &[String], offset: usize, state: &mut ParseState) -> Vec<Node> {
        let mut nodes = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].as_str();
            let trimmed = line.trim();
            let line_no = offset + i + 1;

            if trimmed.is_empty() {
                i += 1;
                continue;
            }

            // Indented text that isn't attached to anything is a block quote
            if is_indented(line) {
                let consumed = indented_extent(&lines[i..]);
                let block = dedent(&lines[i..i + consumed]);
                let children = self.parse_blocks(&block, offset + i, state);
                if !children.is_empty() {
                    nodes.push(Node::BlockQuote {
                        children,
                        line: line_no,
                    });
                }
                i += consumed;
                continue;
            }

            // Explicit markup: directives, targets, substitution definitions, comments
            if line.trim_end() == ".." || line.starts_with(".. ") {
                let consumed = 1 + indented_extent(&lines[i + 1..]);
                if let Some(node) = self.parse_explicit_markup(&lines[i..i + consumed], line_no, state) {
                    nodes.push(node);
                }
                i += consumed;
                continue;
            }

            if let Some(underline) = lines.get(i + 1) {
                if let Some(style) = title_underline(trimmed, underline) {
                    let level = match state.title_styles.iter().position(|c| *c == style) {
                        Some(index) => index + 1,
                        None => {
                            state.title_styles.push(style);
                            state.title_styles.len()
                        }
                    };
                    nodes.push(Node::Title {
                        children: self.parse_inline(trimmed),
                        level,
                        line: line_no,
                    });
                    i += 2;
                    continue;
                }
            }

            let consumed = paragraph_extent(&lines[i..]);
            let text = lines[i..i + consumed]
                .iter()
                .map(|line| line.trim_end())
                .collect::<Vec<_>>()
                .join("\n");
            let (text, literal_follows) = strip_literal_marker(&text);
            if !text.is_empty() {
                nodes.push(Node::Paragraph {
                    children: self.parse_inline(text),
                    line: line_no,
                });
            }
            i += consumed;

            if literal_follows {
                let mut j = i;
                while j < lines.len() && lines[j].trim().is_empty() {
                    j += 1;
                }
                if j < lines.len() && is_indented(&lines[j]) {
                    let extent = indented_extent(&lines[j..]);
                    let block = dedent(&lines[j..j + extent]);
                    nodes.push(Node::LiteralBlock {
                        content: block.join("\n").trim_end().to_string(),
                        line: offset + j + 1,
                    });
                    i = j + extent;
                } else {
                    self.report(
                        state,
                        MessageLevel::Warning,
                        "Literal block expected; none found.".to_string(),
                        offset + i + 1,
                    );
                }
            }
        }

        nodes
    }

    fn parse_explicit_markup(
        &self,
        lines: &[String],
        line_no: usize,
        state: &mut ParseState,
    ) -> Option<Node> {
        let first = lines[0].as_str();
        let body = dedent(&lines[1..]);

        if let Some(captures) = SUBSTITUTION_DEF_REGEX.captures(first) {
            let name = group(&captures, 1);
            let directive = group(&captures, 2);
            if directive != "replace" {
                self.report(
                    state,
                    MessageLevel::Error,
                    format!("Unknown directive type \"{}\".", directive),
                    line_no,
                );
                return None;
            }

            let text = std::iter::once(group(&captures, 3))
                .chain(body.iter().map(|line| line.trim()))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if text.is_empty() {
                self.report(
                    state,
                    MessageLevel::Error,
                    format!("Substitution definition \"{}\" empty or invalid.", name),
                    line_no,
                );
                return None;
            }

            return Some(Node::SubstitutionDefinition {
                name: name.to_string(),
                children: self.parse_inline(&text),
                line: line_no,
            });
        }

        if let Some(captures) = TARGET_REGEX.captures(first) {
            let name = group(&captures, 1).trim_matches('`');
            let uri: String = std::iter::once(group(&captures, 2))
                .chain(body.iter().map(String::as_str))
                .flat_map(|part| part.split_whitespace())
                .collect();
            return Some(Node::Target {
                name: normalize_name(name),
                refuri: if uri.is_empty() { None } else { Some(uri) },
                line: line_no,
            });
        }

        if let Some(captures) = DIRECTIVE_REGEX.captures(first) {
            return self.parse_directive(group(&captures, 1), group(&captures, 2), &body, line_no, state);
        }

        let mut content = first.trim_start_matches('.').trim().to_string();
        for line in &body {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(line);
        }
        Some(Node::Comment {
            content: content.trim_end().to_string(),
            line: line_no,
        })
    }

    fn parse_directive(
        &self,
        name: &str,
        args: &str,
        body: &[String],
        line_no: usize,
        state: &mut ParseState,
    ) -> Option<Node> {
        match name {
            "raw" => {
                if !self.settings.flag("raw_enabled") {
                    self.report(
                        state,
                        MessageLevel::Warning,
                        "\"raw\" directive disabled.".to_string(),
                        line_no,
                    );
                    return None;
                }
                if args.is_empty() {
                    self.report(
                        state,
                        MessageLevel::Error,
                        "The \"raw\" directive requires an output format argument.".to_string(),
                        line_no,
                    );
                    return None;
                }
                let content = body
                    .iter()
                    .skip_while(|line| line.trim_start().starts_with(':'))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(Node::Raw {
                    format: args.split_whitespace().collect::<Vec<_>>().join(" "),
                    content: content.trim().to_string(),
                    line: line_no,
                })
            }
            "include" => {
                let message = if self.settings.flag("file_insertion_enabled") {
                    "\"include\" directive: no file system access when parsing strings.".to_string()
                } else {
                    "\"include\" directive disabled.".to_string()
                };
                self.report(state, MessageLevel::Warning, message, line_no);
                None
            }
            "replace" => {
                self.report(
                    state,
                    MessageLevel::Error,
                    "Invalid context: the \"replace\" directive can only be used within a substitution definition.".to_string(),
                    line_no,
                );
                None
            }
            _ => {
                self.report(
                    state,
                    MessageLevel::Error,
                    format!("Unknown directive type \"{}\".", name),
                    line_no,
                );
                None
            }
        }
    }

    /// Split a text block into inline nodes.
    pub fn parse_inline(&self, text: &str) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut plain_start = 0;
        let mut search_from = 0;

        while let Some(captures) = INLINE_REGEX.captures_at(text, search_from) {
            let Some(whole) = captures.get(0) else {
                break;
            };

            match self.inline_node(text, &captures) {
                Some(node) => {
                    push_text(&mut nodes, &text[plain_start..whole.start()]);
                    nodes.push(node);
                    plain_start = whole.end();
                    search_from = whole.end();
                }
                None => {
                    // Not markup here; retry one character further on
                    search_from = whole.start()
                        + text[whole.start()..]
                            .chars()
                            .next()
                            .map_or(1, char::len_utf8);
                }
            }
        }

        push_text(&mut nodes, &text[plain_start..]);
        nodes
    }

    fn inline_node(&self, text: &str, captures: &Captures<'_>) -> Option<Node> {
        let whole = captures.get(0)?;

        if !self.character_level {
            let before = text[..whole.start()].chars().next_back();
            let after = text[whole.end()..].chars().next();
            if !is_start_context(before) || !is_end_context(after) {
                return None;
            }
        }

        let raw = whole.as_str();

        if let Some(body) = captures.name("literal_body") {
            return Some(Node::Literal {
                text: body.as_str().to_string(),
            });
        }

        if let Some(body) = captures.name("interpreted_body") {
            let body = body.as_str();
            if let Some(role) = captures.name("role") {
                return Some(Node::Interpreted {
                    role: Some(role.as_str().to_string()),
                    text: body.to_string(),
                });
            }
            return Some(match captures.name("reference_suffix") {
                Some(suffix) => Node::Reference(phrase_reference(raw, body, suffix.as_str() == "__")),
                None => Node::Interpreted {
                    role: None,
                    text: body.to_string(),
                },
            });
        }

        if let Some(body) = captures.name("strong_body") {
            return Some(Node::Strong {
                text: body.as_str().to_string(),
            });
        }

        if let Some(body) = captures.name("emphasis_body") {
            return Some(Node::Emphasis {
                text: body.as_str().to_string(),
            });
        }

        if let Some(body) = captures.name("substitution_body") {
            return Some(Node::SubstitutionReference {
                refname: body.as_str().to_string(),
                rawsource: raw.to_string(),
            });
        }

        if let Some(number) = captures.name("pep_number") {
            if !self.settings.flag("pep_references") {
                return None;
            }
            let number: u32 = number.as_str().parse().ok()?;
            let uri = format!("https://peps.python.org/pep-{:04}/", number);
            return Some(Node::Reference(Reference::external(raw, raw, &uri)));
        }

        if let Some(number) = captures.name("rfc_number") {
            if !self.settings.flag("rfc_references") {
                return None;
            }
            let number: u32 = number.as_str().parse().ok()?;
            let uri = format!("https://datatracker.ietf.org/doc/html/rfc{}.html", number);
            return Some(Node::Reference(Reference::external(raw, raw, &uri)));
        }

        if let Some(scheme) = captures.name("scheme") {
            if !KNOWN_SCHEMES.contains(&scheme.as_str().to_lowercase().as_str()) {
                return None;
            }
            return Some(Node::Reference(Reference::standalone(raw)));
        }

        if captures.name("email").is_some() {
            let uri = format!("mailto:{}", raw);
            return Some(Node::Reference(Reference::external(raw, raw, &uri)));
        }

        if let Some(name) = captures.name("simple_name") {
            let anonymous = captures
                .name("simple_suffix")
                .is_some_and(|suffix| suffix.as_str() == "__");
            return Some(Node::Reference(Reference {
                rawsource: raw.to_string(),
                text: name.as_str().to_string(),
                refuri: None,
                refname: if anonymous {
                    None
                } else {
                    Some(normalize_name(name.as_str()))
                },
                anonymous,
            }));
        }

        None
    }
}

/// Build the node for `` `text`_ `` or `` `text <uri>`_ ``.
fn phrase_reference(raw: &str, body: &str, anonymous: bool) -> Reference {
    if let Some(stripped) = body.strip_suffix('>') {
        if let Some(open) = stripped.rfind('<') {
            let before = &stripped[..open];
            if before.is_empty() || before.ends_with(char::is_whitespace) {
                let target: String = stripped[open + 1..].split_whitespace().collect();
                let text = before.trim();
                let text = if text.is_empty() { target.as_str() } else { text };

                // `<name_>` points at another named target instead of a URI
                if let Some(name) = target.strip_suffix('_').filter(|name| !name.is_empty()) {
                    return Reference {
                        rawsource: raw.to_string(),
                        text: text.to_string(),
                        refuri: None,
                        refname: Some(normalize_name(name)),
                        anonymous,
                    };
                }

                return Reference {
                    rawsource: raw.to_string(),
                    text: text.to_string(),
                    refuri: Some(target.clone()),
                    refname: None,
                    anonymous,
                };
            }
        }
    }

    Reference {
        rawsource: raw.to_string(),
        text: body.to_string(),
        refuri: None,
        refname: if anonymous {
            None
        } else {
            Some(normalize_name(body))
        },
        anonymous,
    }
}

fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map_or("", |m| m.as_str())
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text { text: previous }) = nodes.last_mut() {
        previous.push_str(text);
    } else {
        nodes.push(Node::text(text));
    }
}

fn is_start_context(before: Option<char>) -> bool {
    match before {
        None => true,
        Some(c) => c.is_whitespace() || START_CONTEXT.contains(c),
    }
}

fn is_end_context(after: Option<char>) -> bool {
    match after {
        None => true,
        Some(c) => c.is_whitespace() || END_CONTEXT.contains(c),
    }
}

/// Lowercase and collapse whitespace, the way reference names are compared.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut expanded = String::with_capacity(line.len() + tab_width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = tab_width - column % tab_width;
            expanded.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            expanded.push(c);
            column += 1;
        }
    }
    expanded
}

fn is_indented(line: &str) -> bool {
    line.starts_with(char::is_whitespace) && !line.trim().is_empty()
}

/// Number of lines belonging to an indented block (blank lines included,
/// trailing blank lines excluded).
fn indented_extent(lines: &[String]) -> usize {
    let mut extent = 0;
    for (index, line) in lines.iter().enumerate() {
        if is_indented(line) {
            extent = index + 1;
        } else if !line.trim().is_empty() {
            break;
        }
    }
    extent
}

fn paragraph_extent(lines: &[String]) -> usize {
    lines
        .iter()
        .position(|line| line.trim().is_empty())
        .unwrap_or(lines.len())
}

/// Remove the common leading indentation.
fn dedent(lines: &[String]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.chars().skip(indent).collect()
            }
        })
        .collect()
}

/// The underline character if `underline` adorns `title` as a section title.
fn title_underline(title: &str, underline: &str) -> Option<char> {
    if is_indented(underline) {
        return None;
    }
    let underline = underline.trim_end();
    let style = underline.chars().next()?;
    if !TITLE_ADORNMENTS.contains(style) || !underline.chars().all(|c| c == style) {
        return None;
    }
    if underline.chars().count() < title.chars().count() || title.chars().all(|c| c == style) {
        return None;
    }
    Some(style)
}

/// Strip a trailing `::` that announces a literal block.
fn strip_literal_marker(text: &str) -> (&str, bool) {
    let Some(stripped) = text.strip_suffix("::") else {
        return (text, false);
    };
    if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
        (stripped.trim_end(), true)
    } else {
        // "Example::" keeps one colon
        (&text[..text.len() - 1], true)
    }
}
