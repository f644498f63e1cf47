//! End-to-end tests: markup text in, text and link tokens out.

use docstypo3::{assemble, collect_hrefs, parse_string, replacements_from_text, scan, Token};

const DOCS: &str = "https://docs.typo3.org/";

#[test]
fn test_leading_bare_url() {
    let replacement = replacements_from_text("https://docs.typo3.org/ is waiting for you.");
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![Token::link(DOCS, DOCS), Token::text(" is waiting for you.")]
    );
}

#[test]
fn test_url_in_parentheses() {
    let replacement = replacements_from_text("(https://docs.typo3.org/) is waiting for you.");
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![Token::link(DOCS, DOCS), Token::text(" is waiting for you.")]
    );
}

#[test]
fn test_text_before_parenthesized_url() {
    let replacement = replacements_from_text("T3Docs (https://docs.typo3.org/) is waiting for you.");
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![Token::link("T3Docs", DOCS), Token::text(" is waiting for you.")]
    );
}

#[test]
fn test_markdown_style_link() {
    let replacement = replacements_from_text("See also: [TYPO3](https://typo3.org/).");
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![
            Token::text("See also: "),
            Token::link("TYPO3", "https://typo3.org/"),
            Token::text("."),
        ]
    );
}

#[test]
fn test_blank_href_keeps_text() {
    let hrefs = ["", "   "];
    let replacement = assemble(scan("Nothing to link here.", &hrefs));
    assert!(!replacement.healthy);
    assert_eq!(replacement.tokens, vec![Token::text("Nothing to link here.")]);
}

#[test]
fn test_author_with_email() {
    let template = "Martin Bless    <martin.bless@mbless.de>";
    let document = parse_string(template);
    assert_eq!(collect_hrefs(&document), vec!["martin.bless@mbless.de"]);

    let replacement = replacements_from_text(template);
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![
            Token::text("Martin Bless    <"),
            Token::link("martin.bless@mbless.de", "martin.bless@mbless.de"),
            Token::text(">"),
        ]
    );
}

#[test]
fn test_repeated_url() {
    let replacement = replacements_from_text("https://typo3.org/ and again https://typo3.org/");
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![
            Token::link("https://typo3.org/", "https://typo3.org/"),
            Token::text(" and again "),
            Token::link("https://typo3.org/", "https://typo3.org/"),
        ]
    );
}

#[test]
fn test_plain_text_passes_through() {
    let replacement = replacements_from_text("TYPO3 Documentation Team");
    assert!(replacement.healthy);
    assert_eq!(replacement.tokens, vec![Token::text("TYPO3 Documentation Team")]);
}

#[test]
fn test_empty_text() {
    let replacement = replacements_from_text("");
    assert!(replacement.healthy);
    assert!(replacement.tokens.is_empty());
}

#[test]
fn test_phrase_reference_links_its_raw_source() {
    let replacement = replacements_from_text("Read `the docs <https://docs.typo3.org/>`_ now.");
    assert!(replacement.healthy);
    assert_eq!(
        replacement.tokens,
        vec![
            Token::text("Read "),
            Token::link(
                "`the docs <https://docs.typo3.org/>`_",
                "`the docs <https://docs.typo3.org/>`_"
            ),
            Token::text(" now."),
        ]
    );
}
