//! HTML rendering for tokens and parsed documents.

use serde::Serialize;

use crate::assembler::Token;
use crate::document::{Document, Node, Reference};
use crate::error::Result;

/// HTML renderer for link tokens and document trees.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    /// Emit the content of `raw` nodes whose format is `html`.
    raw_html: bool,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self { raw_html: true }
    }

    /// Drop raw HTML instead of passing it through.
    pub fn without_raw_html(mut self) -> Self {
        self.raw_html = false;
        self
    }

    /// Render tokens as inline HTML.
    pub fn render_tokens(&self, tokens: &[Token]) -> String {
        tokens
            .iter()
            .map(|token| match token {
                Token::Text { text } => html_escape::encode_text(text).to_string(),
                Token::Link { text, uri } => external_link(text, uri),
            })
            .collect()
    }

    /// Render a document. Titles open nested `<section>` elements.
    pub fn render_document(&self, document: &Document) -> String {
        let mut html = String::new();
        let mut open_sections: Vec<usize> = Vec::new();

        for node in &document.children {
            if let Node::Title { level, .. } = node {
                let level = (*level).clamp(1, 6);

                // Close sections at the same level or deeper
                while let Some(&open_level) = open_sections.last() {
                    if open_level >= level {
                        html.push_str("</section>\n");
                        open_sections.pop();
                    } else {
                        break;
                    }
                }

                html.push_str(&format!("<section id=\"{}\">\n", slugify(&node.as_text())));
                open_sections.push(level);
            }

            let rendered = self.render_node(node);
            if !rendered.is_empty() {
                html.push_str(&rendered);
                html.push('\n');
            }
        }

        for _ in open_sections {
            html.push_str("</section>\n");
        }

        html
    }

    fn render_node(&self, node: &Node) -> String {
        match node {
            Node::Title {
                children, level, ..
            } => {
                let level = (*level).clamp(1, 6);
                let slug = slugify(&node.as_text());
                format!(
                    "<h{level}>{text}<a class=\"headerlink\" href=\"#{slug}\" title=\"Link to this heading\">¶</a></h{level}>",
                    level = level,
                    slug = slug,
                    text = self.render_inline(children)
                )
            }
            Node::Paragraph { children, .. } => format!("<p>{}</p>", self.render_inline(children)),
            Node::BlockQuote { children, .. } => {
                let inner: Vec<String> = children.iter().map(|child| self.render_node(child)).collect();
                format!("<blockquote>\n{}\n</blockquote>", inner.join("\n"))
            }
            Node::LiteralBlock { content, .. } => format!(
                "<pre class=\"literal-block\">{}</pre>",
                html_escape::encode_text(content)
            ),
            Node::Raw { format, content, .. } => {
                if self.raw_html && format.split_whitespace().any(|f| f == "html") {
                    content.clone()
                } else {
                    String::new()
                }
            }
            Node::Target { name, refuri: None, .. } => {
                // Internal targets become anchors
                format!("<span id=\"{}\"></span>", slugify(name))
            }
            Node::Target { .. } | Node::Comment { .. } | Node::SubstitutionDefinition { .. } => {
                String::new()
            }
            inline => self.render_inline(std::slice::from_ref(inline)),
        }
    }

    fn render_inline(&self, nodes: &[Node]) -> String {
        let mut html = String::new();
        for node in nodes {
            match node {
                Node::Text { text } => html.push_str(&html_escape::encode_text(text)),
                Node::Emphasis { text } => {
                    html.push_str(&format!("<em>{}</em>", html_escape::encode_text(text)))
                }
                Node::Strong { text } => html.push_str(&format!(
                    "<strong>{}</strong>",
                    html_escape::encode_text(text)
                )),
                Node::Literal { text } => html.push_str(&format!(
                    "<code class=\"docutils literal notranslate\"><span class=\"pre\">{}</span></code>",
                    html_escape::encode_text(text)
                )),
                Node::Interpreted { role: None, text } => {
                    html.push_str(&format!("<cite>{}</cite>", html_escape::encode_text(text)))
                }
                Node::Interpreted {
                    role: Some(role),
                    text,
                } => html.push_str(&format!(
                    "<span class=\"{}\">{}</span>",
                    html_escape::encode_double_quoted_attribute(role),
                    html_escape::encode_text(text)
                )),
                Node::Reference(reference) => html.push_str(&reference_link(reference)),
                Node::SubstitutionReference { rawsource, .. } => {
                    html.push_str(&html_escape::encode_text(rawsource))
                }
                block => html.push_str(&self.render_node(block)),
            }
        }
        html
    }
}

fn external_link(text: &str, uri: &str) -> String {
    format!(
        "<a class=\"reference external\" href=\"{}\">{}</a>",
        html_escape::encode_double_quoted_attribute(uri),
        html_escape::encode_text(text)
    )
}

fn reference_link(reference: &Reference) -> String {
    match (&reference.refuri, &reference.refname) {
        (Some(uri), _) => external_link(&reference.text, uri),
        (None, Some(name)) => format!(
            "<a class=\"reference internal\" href=\"#{}\">{}</a>",
            slugify(name),
            html_escape::encode_text(&reference.text)
        ),
        // anonymous references without a target
        (None, None) => html_escape::encode_text(&reference.text).to_string(),
    }
}

/// Serialize tokens, replacements or documents as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Convert text to a URL-safe slug for anchor IDs.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' || c == '.' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::replacements_from_text;
    use crate::parser::parse_string;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("foo_bar-baz"), "foo-bar-baz");
        assert_eq!(slugify("Getting started."), "getting-started");
    }

    #[test]
    fn test_render_tokens() {
        let renderer = HtmlRenderer::new();
        let replacement = replacements_from_text("See also: [TYPO3](https://typo3.org/?a=1&b=2).");
        assert_eq!(
            renderer.render_tokens(&replacement.tokens),
            "See also: <a class=\"reference external\" href=\"https://typo3.org/?a=1&amp;b=2\">TYPO3</a>."
        );
    }

    #[test]
    fn test_angle_brackets_are_escaped() {
        let renderer = HtmlRenderer::new();
        let replacement = replacements_from_text("<https://example.org/>");
        assert_eq!(
            renderer.render_tokens(&replacement.tokens),
            "&lt;<a class=\"reference external\" href=\"https://example.org/\">https://example.org/</a>&gt;"
        );
    }

    #[test]
    fn test_render_document_sections() {
        let renderer = HtmlRenderer::new();
        let document = parse_string("Intro\n=====\n\nVisit https://typo3.org/ now.\n");
        let html = renderer.render_document(&document);
        assert!(html.starts_with("<section id=\"intro\">\n<h1>Intro"), "got: {}", html);
        assert!(html.contains(
            "<p>Visit <a class=\"reference external\" href=\"https://typo3.org/\">https://typo3.org/</a> now.</p>"
        ));
        assert!(html.trim_end().ends_with("</section>"));
    }

    #[test]
    fn test_internal_reference_and_target() {
        let renderer = HtmlRenderer::new();
        let document = parse_string(".. _my-target:\n\nSee my-target_ here.\n");
        let html = renderer.render_document(&document);
        assert!(html.contains("<span id=\"my-target\"></span>"), "got: {}", html);
        assert!(html.contains("<a class=\"reference internal\" href=\"#my-target\">my-target</a>"));
    }

    #[test]
    fn test_raw_html_switch() {
        let document = parse_string(".. raw:: html\n\n   <hr>\n");
        assert_eq!(HtmlRenderer::new().render_document(&document), "<hr>\n");
        assert_eq!(
            HtmlRenderer::new().without_raw_html().render_document(&document),
            ""
        );
    }

    #[test]
    fn test_serialize_replacement() {
        let replacement = replacements_from_text("(https://typo3.org/)");
        let json = to_json(&replacement).unwrap();
        assert!(json.contains("\"healthy\": true"), "got: {}", json);
        assert!(json.contains("\"type\": \"link\""), "got: {}", json);

        let yaml = to_yaml(&replacement.tokens).unwrap();
        assert!(yaml.contains("type: link"), "got: {}", yaml);
        assert!(yaml.contains("https://typo3.org/"), "got: {}", yaml);
    }

    #[test]
    fn test_inline_markup() {
        let renderer = HtmlRenderer::new();
        let document = parse_string("*a* **b** ``c`` `d`");
        assert_eq!(
            renderer.render_document(&document),
            "<p><em>a</em> <strong>b</strong> <code class=\"docutils literal notranslate\"><span class=\"pre\">c</span></code> <cite>d</cite></p>\n"
        );
    }
}
