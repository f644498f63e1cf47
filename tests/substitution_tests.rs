//! Integration tests for the `|cfg_*|` substitution transform.

use std::io::Write;

use tempfile::NamedTempFile;

use docstypo3::{
    parse_string, HtmlRenderer, Node, ProjectConfig, Substitutions, SubstitutionTransform,
};

const SOURCE: &str = "\
Project |cfg_project| by |cfg_author_linked|.

.. |cfg_release| replace:: custom

Release |cfg_release|, version |cfg_version_json|, name |cfg_project_r|.
";

fn project_config() -> ProjectConfig {
    ProjectConfig {
        project: "Guide".to_string(),
        author: "Jane Doe (https://example.org/jane)".to_string(),
        release: "12.4.1".to_string(),
        version: "12.4".to_string(),
        ..Default::default()
    }
}

fn transform(config: &ProjectConfig) -> SubstitutionTransform {
    SubstitutionTransform::new(Substitutions::from_config(config))
}

#[test]
fn test_replaces_configured_values() {
    let mut document = parse_string(SOURCE);
    let replaced = transform(&project_config()).apply(&mut document);

    assert_eq!(replaced, 4);
    assert_eq!(document.children[0].as_text(), "Project Guide by Jane Doe.");
    assert_eq!(
        document.children[2].as_text(),
        "Release |cfg_release|, version \"12.4\", name \"Guide\"."
    );
}

#[test]
fn test_linked_value_becomes_reference() {
    let mut document = parse_string(SOURCE);
    transform(&project_config()).apply(&mut document);

    let references: Vec<_> = document
        .traverse()
        .filter_map(|node| match node {
            Node::Reference(reference) => Some(reference),
            _ => None,
        })
        .collect();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].text, "Jane Doe");
    assert_eq!(references[0].refuri.as_deref(), Some("https://example.org/jane"));

    let html = HtmlRenderer::new().render_document(&document);
    assert!(
        html.contains("<a class=\"reference external\" href=\"https://example.org/jane\">Jane Doe</a>"),
        "got: {}",
        html
    );
}

#[test]
fn test_document_definitions_win() {
    let mut document = parse_string(SOURCE);
    transform(&project_config()).apply(&mut document);

    let remaining: Vec<&str> = document
        .traverse()
        .filter_map(|node| match node {
            Node::SubstitutionReference { refname, .. } => Some(refname.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(remaining, vec!["cfg_release"]);
}

#[test]
fn test_nested_blocks_are_visited() {
    let mut document = parse_string("Title |cfg_project|\n===================\n\n   Quoted |cfg_license|\n");
    let config = ProjectConfig {
        project: "Guide".to_string(),
        license: "CC-BY-4.0".to_string(),
        ..Default::default()
    };
    let replaced = transform(&config).apply(&mut document);

    assert_eq!(replaced, 2);
    assert_eq!(document.as_text(), "Title Guide\n\nQuoted CC-BY-4.0");
}

#[test]
fn test_unknown_names_are_left_alone() {
    let mut document = parse_string("Hello |world| and |cfg_unknown|.");
    let replaced = transform(&project_config()).apply(&mut document);

    assert_eq!(replaced, 0);
    assert_eq!(document.as_text(), "Hello |world| and |cfg_unknown|.");
}

#[test]
fn test_config_file_feeds_substitutions() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "project: TYPO3 Explained\nt3author: TYPO3 Documentation Team").unwrap();
    file.flush().unwrap();

    let config = ProjectConfig::load(Some(file.path())).unwrap();
    let mut document = parse_string("|cfg_project| by |cfg_author|");
    transform(&config).apply(&mut document);

    assert_eq!(
        document.as_text(),
        "TYPO3 Explained by TYPO3 Documentation Team"
    );
}
