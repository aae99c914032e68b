//! Structural extraction over a parsed file.
//!
//! Each category's query yields a flat stream of captures. A capture is
//! attributed to its definition by walking ancestors from the captured node
//! up to the first node whose kind counts as a definition for the category;
//! properties are indexed by that node's start byte. Several independent
//! patterns may contribute to the same definition.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use streaming_iterator::StreamingIterator;
use tracing::{debug, warn};
use tree_sitter::{Node, Query, QueryCursor};

use crate::association::associate_methods;
use crate::calls::extract_calls;
use crate::docstring::extract_doc;
use crate::lang::{QueryCatalog, QueryCategory, definition_kinds};
use crate::model::{Class, FileInfo, Function, Import};
use crate::options::AnalysisOptions;
use crate::parser::{ExtractError, ParsedFile};

/// Properties gathered for one definition node.
#[derive(Default)]
struct Pending<'t> {
    node: Option<Node<'t>>,
    name: Option<String>,
    params: Option<String>,
    return_type: Option<String>,
    body: Option<Node<'t>>,
    bases: Vec<(usize, String)>,
    names: Vec<(usize, String)>,
    modules: Vec<(usize, String)>,
}

/// Extracts imports, classes, functions and calls from parsed files.
///
/// Holds only shared, read-only state; one instance serves every worker.
pub struct Extractor<'a> {
    catalog: &'a QueryCatalog,
    options: &'a AnalysisOptions,
}

impl<'a> Extractor<'a> {
    pub fn new(catalog: &'a QueryCatalog, options: &'a AnalysisOptions) -> Self {
        Self { catalog, options }
    }

    /// Extract a file record.
    ///
    /// Methods are associated with their classes and the visibility filter
    /// is applied before returning. Problems are recorded on the record.
    pub fn extract(&self, parsed: &ParsedFile, path: &str) -> FileInfo {
        let mut file = FileInfo::new(path, Some(parsed.language));

        if parsed.has_syntax_errors() {
            debug!(path, "syntax errors in tree, continuing");
            file.push_error(ExtractError::ParseFailure(
                "tree contains syntax errors".to_string(),
            ));
        }

        file.imports = self.extract_imports(parsed, &mut file.errors);

        if self.options.granularity.is_detailed() {
            file.classes = self.extract_classes(parsed, &mut file.errors);
            file.functions = self.extract_functions(parsed, &mut file.errors);
            associate_methods(&mut file);
            if !self.options.include_private {
                drop_private(&mut file);
            }
        }

        file
    }

    fn query(
        &self,
        parsed: &ParsedFile,
        category: QueryCategory,
        errors: &mut Vec<String>,
    ) -> Option<&'a Query> {
        match self.catalog.get(parsed.language, category) {
            Ok(query) => Some(query),
            Err(e) => {
                warn!("{e}");
                errors.push(e.to_string());
                None
            }
        }
    }

    fn extract_imports(&self, parsed: &ParsedFile, errors: &mut Vec<String>) -> Vec<Import> {
        let Some(query) = self.query(parsed, QueryCategory::Imports, errors) else {
            return Vec::new();
        };
        let pending = collect(query, QueryCategory::Imports, parsed);

        let mut imports = Vec::new();
        for def in pending.into_values() {
            let Some(node) = def.node else { continue };
            let raw = collapse_whitespace(parsed.node_text(node));
            let line = node.start_position().row + 1;
            let names = in_source_order(def.names);
            for module in in_source_order(def.modules) {
                imports.push(Import {
                    raw: raw.clone(),
                    module,
                    names: names.clone(),
                    line,
                });
            }
        }
        imports
    }

    fn extract_classes(&self, parsed: &ParsedFile, errors: &mut Vec<String>) -> Vec<Class> {
        let Some(query) = self.query(parsed, QueryCategory::Classes, errors) else {
            return Vec::new();
        };
        let pending = collect(query, QueryCategory::Classes, parsed);

        let mut classes = Vec::new();
        for (offset, def) in pending {
            let (Some(node), Some(name)) = (def.node, def.name) else {
                continue;
            };
            let mut class = Class::new(
                name,
                node.start_position().row + 1,
                node.end_position().row + 1,
            )
            .with_bases(in_source_order(def.bases))
            .with_offset(offset);
            class.is_private = is_private_name(&class.name);
            if self.options.include_docstrings {
                class.doc = extract_doc(node, def.body, parsed.language.doc_style(), &parsed.source);
            }
            classes.push(class);
        }
        classes
    }

    fn extract_functions(&self, parsed: &ParsedFile, errors: &mut Vec<String>) -> Vec<Function> {
        let Some(query) = self.query(parsed, QueryCategory::Functions, errors) else {
            return Vec::new();
        };
        let calls_query = self.query(parsed, QueryCategory::Calls, errors);
        let pending = collect(query, QueryCategory::Functions, parsed);
        let class_kinds = definition_kinds(QueryCategory::Classes);

        let mut functions = Vec::new();
        for (offset, def) in pending {
            let (Some(node), Some(name)) = (def.node, def.name) else {
                continue;
            };
            let mut function = Function::new(
                name,
                node.start_position().row + 1,
                node.end_position().row + 1,
            )
            .with_offset(offset);

            function.is_private = is_private_name(&function.name);
            function.is_method = node
                .parent()
                .and_then(|parent| owning_definition(parent, class_kinds))
                .is_some()
                || node.child_by_field_name("receiver").is_some();

            if self.options.include_signatures {
                function.parameters = def.params.unwrap_or_default();
                function.return_type = def.return_type.unwrap_or_default();
            }
            if self.options.include_docstrings {
                function.doc =
                    extract_doc(node, def.body, parsed.language.doc_style(), &parsed.source);
            }
            if let Some(calls_query) = calls_query {
                let scope = def.body.unwrap_or(node);
                function.calls = extract_calls(calls_query, scope, parsed.source_bytes());
            }
            functions.push(function);
        }
        functions
    }
}

/// Run a query and group its captures by owning definition.
fn collect<'t>(
    query: &Query,
    category: QueryCategory,
    parsed: &'t ParsedFile,
) -> BTreeMap<usize, Pending<'t>> {
    let kinds = definition_kinds(category);
    let labels = query.capture_names();
    let source = parsed.source_bytes();

    let mut pending: BTreeMap<usize, Pending<'t>> = BTreeMap::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, parsed.root_node(), source);

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let label = labels[capture.index as usize];
            if label.starts_with('_') {
                continue;
            }
            let Some(owner) = owning_definition(capture.node, kinds) else {
                continue;
            };
            let def = pending.entry(owner.start_byte()).or_default();
            def.node.get_or_insert(owner);

            let at = capture.node.start_byte();
            let text = capture.node.utf8_text(source).unwrap_or("").trim();
            match (category, label) {
                (QueryCategory::Imports, "name") => def.names.push((at, text.to_string())),
                (QueryCategory::Classes, "name") => {
                    let name = class_name(text);
                    if def.name.is_none() && !name.is_empty() {
                        def.name = Some(name);
                    }
                }
                (_, "name") => {
                    if def.name.is_none() && !text.is_empty() {
                        def.name = Some(text.to_string());
                    }
                }
                (_, "params") => {
                    def.params.get_or_insert_with(|| text.to_string());
                }
                (_, "return_type") => {
                    def.return_type.get_or_insert_with(|| return_type(text));
                }
                (_, "body") => {
                    def.body.get_or_insert(capture.node);
                }
                (_, "bases") => {
                    def.bases
                        .extend(base_tokens(text).into_iter().map(|base| (at, base)));
                }
                (_, "module") => {
                    let module = normalize_module(text);
                    if !module.is_empty() {
                        def.modules.push((at, module));
                    }
                }
                (_, "wildcard") => def.names.push((at, "*".to_string())),
                _ => {}
            }
        }
    }

    pending
}

/// Walk from `node` up to the first named definition node of the given kinds.
///
/// The root never counts: Python's root kind is `module`, which is also a
/// class kind in Ruby.
fn owning_definition<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node;
    loop {
        let parent = current.parent()?;
        if current.is_named() && kinds.contains(&current.kind()) {
            return Some(current);
        }
        current = parent;
    }
}

/// Sort positioned values by source offset and drop repeats.
fn in_source_order(mut items: Vec<(usize, String)>) -> Vec<String> {
    items.sort_by_key(|(at, _)| *at);
    let mut ordered = Vec::with_capacity(items.len());
    for (_, value) in items {
        push_unique(&mut ordered, value);
    }
    ordered
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Returns true for `_name` but not for `__dunder__`.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__"))
}

/// Remove private classes, methods and free functions.
fn drop_private(file: &mut FileInfo) {
    file.classes.retain(|class| !class.is_private);
    for class in &mut file.classes {
        class.methods.retain(|method| !method.is_private);
    }
    file.functions.retain(|function| !function.is_private);
}

/// Reduce a type expression to a bare class name.
///
/// `Foo<T>` becomes `Foo`, `crate::model::Foo` becomes `Foo` and `&mut Foo`
/// becomes `Foo`.
fn class_name(text: &str) -> String {
    let text = text.split('<').next().unwrap_or(text);
    let text = text.rsplit("::").next().unwrap_or(text);
    let text = text.trim().trim_start_matches('&').trim();
    text.strip_prefix("mut ").unwrap_or(text).trim().to_string()
}

/// Capitalized identifiers in a base-list text, generic arguments removed.
fn base_tokens(text: &str) -> Vec<String> {
    static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(token) = TOKEN
        .get_or_init(|| Regex::new(r"[A-Z][A-Za-z0-9_]*").ok())
        .as_ref()
    else {
        return Vec::new();
    };

    let stripped = strip_brackets(text);
    let mut tokens: Vec<String> = Vec::new();
    for m in token.find_iter(&stripped) {
        // Skip the middle of identifiers like `my_Base`.
        let preceded_by_ident = stripped[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if !preceded_by_ident {
            push_unique(&mut tokens, m.as_str().to_string());
        }
    }
    tokens
}

/// Drop everything inside `<...>` and `[...]`, nesting included.
///
/// `<` opens a bracket only after an identifier character, so Ruby's
/// `< Animal` superclass marker and C++ `: public Base<T>` both tokenize.
fn strip_brackets(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        match c {
            '<' if prev.is_some_and(|p| p.is_alphanumeric() || p == '_') => depth += 1,
            '[' => depth += 1,
            '>' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
        prev = Some(c);
    }
    out
}

/// Strip quotes, angle brackets and backticks; cut `as` aliases.
fn normalize_module(text: &str) -> String {
    let text = text.trim();
    let text = text.split(" as ").next().unwrap_or(text);
    text.trim_matches(|c| matches!(c, '"' | '\'' | '`' | '<' | '>'))
        .trim()
        .to_string()
}

/// Return-type text without a leading `:` or `->`.
fn return_type(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("->").unwrap_or(text);
    let text = text.trim_start().strip_prefix(':').unwrap_or(text);
    text.trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
