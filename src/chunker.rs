//! Splits a template string into plain-text and link chunks.
//!
//! The hrefs are the raw sources of the hyperlinks found when the template
//! was parsed as markup, in the order they occur. They are matched against
//! a cursor that only moves forward. Each href is located by its first
//! occurrence in the unscanned rest of the template, and the punctuation
//! around it decides how the link text is chosen:
//!
//! ```text
//! https://example.org                   ->  link "https://example.org"
//! (https://example.org)                 ->  link "https://example.org"
//! [  ](https://example.org)             ->  link "https://example.org"
//! <https://example.org>                 ->  "<", link "https://example.org", ">"
//! Home (https://example.org)            ->  link "Home"
//! Text [linktext](https://example.org)  ->  "Text ", link "linktext"
//! ```
//!
//! Hrefs that are blank or missing from the text are skipped and make the
//! scan unhealthy. So does an href that arrives after the text ran out.

use std::collections::VecDeque;

use log::trace;
use serde::Serialize;

/// One piece of output: display text, an optional link target and whether
/// the scan was still healthy when the piece was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk<'a> {
    pub span: &'a str,
    pub link: Option<&'a str>,
    pub healthy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Scanning,
    Finished,
}

/// Lazy iterator over the chunks of a template. Created by [`scan`].
#[derive(Debug, Clone)]
pub struct Chunks<'a, S> {
    cursor: &'a str,
    hrefs: std::slice::Iter<'a, S>,
    healthy: bool,
    pending: VecDeque<Chunk<'a>>,
    state: State,
}

/// Scan `template` for the given hrefs.
///
/// Without any hrefs the whole template comes back as a single healthy
/// chunk. Once a chunk is unhealthy, all following chunks are too.
pub fn scan<'a, S: AsRef<str>>(template: &'a str, hrefs: &'a [S]) -> Chunks<'a, S> {
    Chunks {
        cursor: template,
        hrefs: hrefs.iter(),
        healthy: true,
        pending: VecDeque::new(),
        state: State::Start,
    }
}

impl<'a, S: AsRef<str>> Chunks<'a, S> {
    /// Whether every href seen so far was found and attached to text.
    pub fn healthy(&self) -> bool {
        self.healthy
    }

    fn emit(&mut self, span: &'a str, link: Option<&'a str>) {
        self.pending.push_back(Chunk {
            span,
            link,
            healthy: self.healthy,
        });
    }

    fn finish(&mut self) {
        self.state = State::Finished;
    }

    /// Process one href, or the end of input. Emits zero or more chunks.
    fn step(&mut self) {
        if self.state == State::Start {
            self.state = State::Scanning;
            if self.cursor.trim().is_empty() && self.hrefs.len() == 0 {
                self.emit(self.cursor, None);
                self.finish();
                return;
            }
        }

        let Some(href) = self.hrefs.next() else {
            if !self.cursor.is_empty() {
                self.emit(self.cursor, None);
            }
            self.finish();
            return;
        };

        if self.cursor.trim().is_empty() {
            // an href is left but there is no text to attach it to
            self.healthy = false;
            self.emit(self.cursor, None);
            self.finish();
            return;
        }

        let href = <S as AsRef<str>>::as_ref(href).trim();
        if href.is_empty() {
            self.healthy = false;
            return;
        }

        match self.cursor.find(href) {
            None => {
                trace!("href {:?} not found in {:?}", href, self.cursor);
                self.healthy = false;
            }
            Some(0) => {
                self.emit(href, Some(href));
                self.cursor = &self.cursor[href.len()..];
            }
            Some(position) => self.emit_enclosed(href, position),
        }
    }

    /// Handle an href found after some leading text.
    fn emit_enclosed(&mut self, href: &'a str, position: usize) {
        let cursor = self.cursor;
        let before = &cursor[..position];
        let after = &cursor[position + href.len()..];

        match (before.chars().next_back(), after.chars().next()) {
            (Some('('), Some(')')) => {
                let head = &before[..before.len() - 1];
                match bracketed_text(head) {
                    Some(open) => {
                        let text = &head[..open];
                        if !text.is_empty() {
                            self.emit(text, None);
                        }
                        let link_text = &head[open + 1..head.len() - 1];
                        let link_text = if link_text.trim().is_empty() {
                            href
                        } else {
                            link_text
                        };
                        self.emit(link_text, Some(href));
                    }
                    None => {
                        let body = head.trim_end();
                        let whitespace = &head[body.len()..];
                        if !body.is_empty() {
                            self.emit(body, Some(href));
                        } else {
                            if !whitespace.is_empty() {
                                self.emit(whitespace, None);
                            }
                            self.emit(href, Some(href));
                        }
                    }
                }
                self.cursor = &after[1..];
            }
            (Some('<'), Some('>')) => {
                self.emit(before, None);
                self.emit(href, Some(href));
                self.emit(&after[..1], None);
                self.cursor = &after[1..];
            }
            _ => {
                self.emit(before, None);
                self.emit(href, Some(href));
                self.cursor = after;
            }
        }
    }
}

impl<'a, S: AsRef<str>> Iterator for Chunks<'a, S> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Some(chunk);
            }
            if self.state == State::Finished {
                return None;
            }
            self.step();
        }
    }
}

/// For text that directly precedes a `(`: if it ends with `]`, the index of
/// the nearest `[` before that bracket.
pub fn bracketed_text(head: &str) -> Option<usize> {
    let inner = head.strip_suffix(']')?;
    inner.rfind('[')
}
