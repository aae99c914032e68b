//! Doc text extraction.
//!
//! Python documents a definition with a string literal as the first statement
//! of its body. Everything else uses comments placed directly above the
//! definition.

use tree_sitter::Node;

use crate::options::MAX_DOC_CHARS;
use crate::parser::DocStyle;

const COMMENT_KINDS: &[&str] = &["comment", "line_comment", "block_comment"];

/// Nodes that may sit between a doc comment and the definition it documents.
const ATTRIBUTE_KINDS: &[&str] = &["attribute_item", "decorator"];

/// Nodes that wrap a definition without changing what it documents.
const WRAPPER_KINDS: &[&str] = &[
    "export_statement",
    "decorated_definition",
    "type_declaration",
    "template_declaration",
    "lexical_declaration",
    "variable_declaration",
];

/// Extract doc text for a definition node, truncated.
///
/// `body` is the definition's body node when the grammar exposes one.
pub fn extract_doc(
    definition: Node<'_>,
    body: Option<Node<'_>>,
    style: DocStyle,
    source: &str,
) -> String {
    let doc = match style {
        DocStyle::BodyString => body.and_then(|b| body_docstring(b, source)),
        DocStyle::LeadingComment => leading_comment(definition, source),
    };
    doc.map(|d| truncate_doc(&d)).unwrap_or_default()
}

/// Truncate doc text to the character limit, appending `...` when cut.
pub fn truncate_doc(text: &str) -> String {
    if text.chars().count() <= MAX_DOC_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_DOC_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Read a bare string literal that is the first statement of a block.
fn body_docstring(body: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| !COMMENT_KINDS.contains(&n.kind()))?;

    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" || first.named_child_count() != 1 {
        return None;
    }

    let text = strip_string_quotes(&source[literal.byte_range()]);
    let doc = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    (!doc.is_empty()).then_some(doc)
}

/// Remove string prefixes (`r`, `u`, `b`, `f`) and quotes from a literal.
fn strip_string_quotes(literal: &str) -> &str {
    let unprefixed = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = unprefixed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    unprefixed
}

/// Collect the contiguous run of comments directly above a definition.
fn leading_comment(definition: Node<'_>, source: &str) -> Option<String> {
    let mut anchor = definition;
    while let Some(parent) = anchor.parent() {
        if !WRAPPER_KINDS.contains(&parent.kind()) {
            break;
        }
        anchor = parent;
    }

    let mut blocks = Vec::new();
    let mut next_row = anchor.start_position().row;
    let mut sibling = anchor.prev_named_sibling();

    while let Some(prev) = sibling {
        let kind = prev.kind();
        if ATTRIBUTE_KINDS.contains(&kind) {
            next_row = prev.start_position().row;
            sibling = prev.prev_named_sibling();
            continue;
        }
        if !COMMENT_KINDS.contains(&kind) || last_row(prev) + 1 < next_row {
            break;
        }
        blocks.push(clean_comment(&source[prev.byte_range()]));
        next_row = prev.start_position().row;
        sibling = prev.prev_named_sibling();
    }

    blocks.reverse();
    let doc = blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!doc.is_empty()).then_some(doc)
}

/// Last row a node occupies; a trailing newline does not count.
fn last_row(node: Node<'_>) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row - 1
    } else {
        end.row
    }
}

/// Strip comment markers from every line of a comment.
fn clean_comment(text: &str) -> String {
    text.lines()
        .map(|line| {
            let mut line = line.trim();
            for marker in ["///", "//!", "//", "/**", "/*!", "/*", "#"] {
                if let Some(rest) = line.strip_prefix(marker) {
                    line = rest;
                    break;
                }
            }
            let line = line.strip_suffix("*/").unwrap_or(line);
            line.trim_start_matches('*').trim()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Language, Parser};

    fn first_named<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        children.into_iter().find_map(|child| first_named(child, kind))
    }

    fn doc_for(source: &str, language: Language, kind: &str) -> String {
        let mut parser = Parser::new();
        let parsed = parser.parse_source(source, language).unwrap();
        let node = first_named(parsed.root_node(), kind).expect("definition node");
        let body = node.child_by_field_name("body");
        extract_doc(node, body, language.doc_style(), &parsed.source)
    }

    #[test]
    fn test_python_docstring() {
        let source = r#"
def greet(name):
    """Return a greeting message."""
    return "hi " + name
"#;
        assert_eq!(
            doc_for(source, Language::Python, "function_definition"),
            "Return a greeting message."
        );
    }

    #[test]
    fn test_python_docstring_must_be_first_statement() {
        let source = r#"
def greet(name):
    x = 1
    """Not a docstring."""
"#;
        assert_eq!(doc_for(source, Language::Python, "function_definition"), "");
    }

    #[test]
    fn test_python_multiline_docstring() {
        let source = "class A:\n    '''First line.\n\n    More detail.\n    '''\n    pass\n";
        assert_eq!(
            doc_for(source, Language::Python, "class_definition"),
            "First line.\n\nMore detail."
        );
    }

    #[test]
    fn test_rust_doc_comment_through_attributes() {
        let source = r#"
/// A documented struct.
/// Second line.
#[derive(Debug)]
pub struct Foo {
    bar: i32,
}
"#;
        assert_eq!(
            doc_for(source, Language::Rust, "struct_item"),
            "A documented struct.\nSecond line."
        );
    }

    #[test]
    fn test_comment_separated_by_blank_line_is_ignored() {
        let source = "// unrelated\n\nfn lonely() {}\n";
        assert_eq!(doc_for(source, Language::Rust, "function_item"), "");
    }

    #[test]
    fn test_jsdoc_on_exported_function() {
        let source = r#"
/**
 * Adds two numbers.
 */
export function add(a, b) {
  return a + b;
}
"#;
        assert_eq!(
            doc_for(source, Language::JavaScript, "function_declaration"),
            "Adds two numbers."
        );
    }

    #[test]
    fn test_go_comment() {
        let source = "package main\n\n// Run starts the server.\nfunc Run() {}\n";
        assert_eq!(
            doc_for(source, Language::Go, "function_declaration"),
            "Run starts the server."
        );
    }

    #[test]
    fn test_truncation_python_and_comment_styles() {
        let long = "x".repeat(250);

        let py = format!("def f():\n    \"\"\"{long}\"\"\"\n    pass\n");
        let doc = doc_for(&py, Language::Python, "function_definition");
        assert_eq!(doc.chars().count(), MAX_DOC_CHARS + 3);
        assert!(doc.ends_with("..."));

        let rs = format!("/// {long}\nfn f() {{}}\n");
        let doc = doc_for(&rs, Language::Rust, "function_item");
        assert_eq!(doc.chars().count(), MAX_DOC_CHARS + 3);
        assert!(doc.ends_with("..."));
    }

    #[test]
    fn test_truncate_doc_boundaries() {
        let exact = "a".repeat(MAX_DOC_CHARS);
        assert_eq!(truncate_doc(&exact), exact);

        let multibyte = "é".repeat(MAX_DOC_CHARS + 1);
        let truncated = truncate_doc(&multibyte);
        assert_eq!(truncated.chars().count(), MAX_DOC_CHARS + 3);
    }

    #[test]
    fn test_strip_string_quotes() {
        assert_eq!(strip_string_quotes("\"\"\"doc\"\"\""), "doc");
        assert_eq!(strip_string_quotes("r'raw'"), "raw");
        assert_eq!(strip_string_quotes("'single'"), "single");
    }

    #[test]
    fn test_clean_comment() {
        assert_eq!(clean_comment("/// hello"), "hello");
        assert_eq!(clean_comment("# ruby style"), "ruby style");
        assert_eq!(
            clean_comment("/**\n * Block doc.\n * More.\n */"),
            "Block doc.\nMore."
        );
    }
}
