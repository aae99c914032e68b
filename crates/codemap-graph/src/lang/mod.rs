//! Grammar registry and query catalog.
//!
//! Each language module holds declarative tree-sitter patterns for the four
//! extraction categories. Patterns only name capture points (`@name`,
//! `@params`, `@return_type`, `@body`, `@bases`, `@module`, `@callee`, ...);
//! the extractor re-associates captures with their definition by walking
//! ancestors up to one of the kinds listed in [`definition_kinds`].

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tree_sitter::Query;

use crate::parser::{ExtractError, Language};

mod c;
mod go;
mod java;
mod javascript;
mod php;
mod python;
mod ruby;
mod rust;

/// The kind of structure a query extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryCategory {
    Imports,
    Classes,
    Functions,
    Calls,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 4] = [
        QueryCategory::Imports,
        QueryCategory::Classes,
        QueryCategory::Functions,
        QueryCategory::Calls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::Imports => "imports",
            QueryCategory::Classes => "classes",
            QueryCategory::Functions => "functions",
            QueryCategory::Calls => "calls",
        }
    }
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic patterns used for languages without a dedicated pattern set.
///
/// Each matches the most common node shape for its category; compiling one
/// against a grammar that lacks the shape fails and degrades to an empty
/// result for that category.
const FALLBACK_IMPORTS: &str = r#"
(import_statement) @import
"#;

const FALLBACK_CLASSES: &str = r#"
(class_definition
  name: (_) @name) @class
"#;

const FALLBACK_FUNCTIONS: &str = r#"
(function_definition
  name: (_) @name) @function

(function_definition
  body: (_) @body)
"#;

const FALLBACK_CALLS: &str = r#"
(call_expression
  function: (_) @callee)
"#;

/// Dedicated pattern source for a language, if the catalog has one.
fn dedicated_query(language: Language, category: QueryCategory) -> Option<&'static str> {
    match language {
        Language::Python => Some(python::query(category)),
        Language::Rust => Some(rust::query(category)),
        Language::C => Some(c::c_query(category)),
        Language::Cpp => Some(c::cpp_query(category)),
        Language::JavaScript => Some(javascript::javascript_query(category)),
        Language::TypeScript | Language::Tsx => Some(javascript::typescript_query(category)),
        Language::Go => Some(go::query(category)),
        Language::Java => Some(java::java_query(category)),
        Language::CSharp => Some(java::csharp_query(category)),
        Language::Ruby => Some(ruby::query(category)),
        Language::Php => Some(php::query(category)),
        Language::Bash => None,
    }
}

/// The generic fallback pattern for a category.
pub fn fallback_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => FALLBACK_IMPORTS,
        QueryCategory::Classes => FALLBACK_CLASSES,
        QueryCategory::Functions => FALLBACK_FUNCTIONS,
        QueryCategory::Calls => FALLBACK_CALLS,
    }
}

/// Pattern source for a language and category, falling back to the generic
/// pattern for languages the catalog does not cover.
pub fn query_for(language: Language, category: QueryCategory) -> &'static str {
    dedicated_query(language, category).unwrap_or_else(|| fallback_query(category))
}

/// Returns true if the language has its own pattern set.
pub fn has_dedicated_queries(language: Language) -> bool {
    dedicated_query(language, QueryCategory::Functions).is_some()
}

/// Node kinds that count as the definition node for a category, across all
/// languages. Calls have none: a callee capture stands on its own.
pub fn definition_kinds(category: QueryCategory) -> &'static [&'static str] {
    match category {
        QueryCategory::Imports => IMPORT_KINDS,
        QueryCategory::Classes => CLASS_KINDS,
        QueryCategory::Functions => FUNCTION_KINDS,
        QueryCategory::Calls => &[],
    }
}

const IMPORT_KINDS: &[&str] = &[
    // Python
    "import_statement",
    "import_from_statement",
    "future_import_statement",
    // Rust
    "use_declaration",
    "mod_item",
    "extern_crate_declaration",
    // Go / Java
    "import_spec",
    "import_declaration",
    // C / C++
    "preproc_include",
    // C#
    "using_directive",
    // PHP
    "namespace_use_clause",
    "require_expression",
    "require_once_expression",
    "include_expression",
    "include_once_expression",
    // CommonJS require() / Ruby require
    "call_expression",
    "call",
];

const CLASS_KINDS: &[&str] = &[
    "class_definition",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "struct_declaration",
    "trait_declaration",
    "class_specifier",
    "struct_specifier",
    "struct_item",
    "enum_item",
    "trait_item",
    "impl_item",
    "type_spec",
    "class",
    "module",
];

const FUNCTION_KINDS: &[&str] = &[
    "function_definition",
    "function_declaration",
    "generator_function_declaration",
    "function_item",
    "function_signature_item",
    "method_definition",
    "method_declaration",
    "constructor_declaration",
    "method",
    "singleton_method",
    "variable_declarator",
];

/// Compiled queries, keyed by language and category.
///
/// Constructed once per run and shared read-only. Each query compiles on
/// first use; the outcome (including failure) is cached.
pub struct QueryCatalog {
    queries: HashMap<(Language, QueryCategory), OnceLock<Result<Query, String>>>,
}

impl QueryCatalog {
    /// Create a catalog covering every supported language.
    pub fn new() -> Self {
        let mut queries = HashMap::new();
        for language in Language::ALL {
            for category in QueryCategory::ALL {
                queries.insert((language, category), OnceLock::new());
            }
        }
        Self { queries }
    }

    /// Get the compiled query, compiling it if needed.
    pub fn get(
        &self,
        language: Language,
        category: QueryCategory,
    ) -> Result<&Query, ExtractError> {
        let failure = |reason: String| ExtractError::QueryFailure {
            language: language.name(),
            category: category.as_str(),
            reason,
        };

        let slot = self
            .queries
            .get(&(language, category))
            .ok_or_else(|| failure("no catalog entry".to_string()))?;

        slot.get_or_init(|| {
            Query::new(
                &language.tree_sitter_language(),
                query_for(language, category),
            )
            .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| failure(e.clone()))
    }
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_queries_compile() {
        let catalog = QueryCatalog::new();
        for language in Language::ALL {
            if !has_dedicated_queries(language) {
                continue;
            }
            for category in QueryCategory::ALL {
                if let Err(e) = catalog.get(language, category) {
                    panic!("{e}");
                }
            }
        }
    }

    #[test]
    fn test_fallback_for_uncovered_language() {
        assert!(!has_dedicated_queries(Language::Bash));
        assert_eq!(
            query_for(Language::Bash, QueryCategory::Functions),
            FALLBACK_FUNCTIONS
        );
        assert_ne!(
            query_for(Language::Python, QueryCategory::Functions),
            FALLBACK_FUNCTIONS
        );
    }

    #[test]
    fn test_fallback_failure_is_reported() {
        let catalog = QueryCatalog::new();
        // Bash has functions but no classes.
        assert!(catalog.get(Language::Bash, QueryCategory::Functions).is_ok());
        let err = catalog
            .get(Language::Bash, QueryCategory::Classes)
            .err()
            .expect("bash has no class_definition");
        assert!(err.to_string().contains("classes"));
    }

    #[test]
    fn test_captures_use_known_labels() {
        const LABELS: &[&str] = &[
            "name",
            "params",
            "return_type",
            "body",
            "bases",
            "module",
            "wildcard",
            "callee",
            "import",
            "class",
            "function",
        ];
        let catalog = QueryCatalog::new();
        for language in Language::ALL.into_iter().filter(|l| has_dedicated_queries(*l)) {
            for category in QueryCategory::ALL {
                let query = catalog.get(language, category).unwrap();
                for label in query.capture_names() {
                    assert!(
                        LABELS.contains(label) || label.starts_with('_'),
                        "{} {category}: unexpected capture @{label}",
                        language.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_definition_kinds() {
        assert!(definition_kinds(QueryCategory::Classes).contains(&"impl_item"));
        assert!(definition_kinds(QueryCategory::Functions).contains(&"function_item"));
        assert!(definition_kinds(QueryCategory::Imports).contains(&"use_declaration"));
        assert!(definition_kinds(QueryCategory::Calls).is_empty());
    }
}
