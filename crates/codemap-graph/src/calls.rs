//! Call-name extraction scoped to a function body.

use std::collections::HashSet;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use crate::options::MAX_CALLS;

/// Language built-ins and macros that never enter a call list.
///
/// Only names a project cannot shadow in practice belong here; method names
/// like `get` or `parse` stay, since they are often defined locally.
const DENYLIST: &[&str] = &[
    // Python
    "print", "len", "str", "int", "float", "bool", "list", "dict", "set", "tuple", "range",
    "enumerate", "zip", "map", "filter", "sorted", "reversed", "isinstance", "hasattr",
    "getattr", "setattr", "super", "repr",
    // JavaScript / TypeScript
    "console", "log", "require", "import", "parseInt", "parseFloat",
    // Rust
    "println", "eprintln", "format", "write", "writeln", "vec", "panic", "assert",
    "assert_eq", "assert_ne", "debug_assert", "Some", "None", "Ok", "Err", "Box",
    // C / C++
    "printf", "fprintf", "sprintf", "snprintf", "puts", "malloc", "calloc", "realloc", "free",
    "sizeof", "memcpy", "memset", "strlen", "strcmp",
    // Go
    "Println", "Printf", "Sprintf", "Errorf", "make", "cap",
    // Java / C#
    "WriteLine",
    // PHP
    "echo", "isset", "array",
];

/// Collect callee names under `scope` in source order.
///
/// Qualified callees keep their last segment. The list is filtered through
/// the denylist, deduplicated in first-seen order and capped.
pub fn extract_calls(query: &Query, scope: Node<'_>, source: &[u8]) -> Vec<String> {
    let names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, scope, source);

    let mut found: Vec<(usize, String)> = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            if names[capture.index as usize] != "callee" {
                continue;
            }
            let text = capture.node.utf8_text(source).unwrap_or("");
            let callee = last_segment(text);
            if !callee.is_empty() {
                found.push((capture.node.start_byte(), callee.to_string()));
            }
        }
    }
    found.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, callee)| callee)
        .filter(|callee| !is_denied(callee))
        .filter(|callee| seen.insert(callee.clone()))
        .take(MAX_CALLS)
        .collect()
}

/// Returns true if the name is a built-in or noise identifier.
pub fn is_denied(name: &str) -> bool {
    DENYLIST.contains(&name)
}

/// `a::b::c`, `a.b.c`, `a->c` and `\A\B\c` all reduce to `c`.
fn last_segment(text: &str) -> &str {
    let text = text.trim();
    let cut = ["::", "->", ".", "\\"]
        .iter()
        .filter_map(|sep| text.rfind(sep).map(|i| i + sep.len()))
        .max()
        .unwrap_or(0);
    text[cut..].trim()
}
