//! Entity and relationship types shared by extraction, association and resolution.
//!
//! These types form the uniform model every language is lowered into. They
//! are produced per file by the extractor, reshaped by method association,
//! and read by the resolver and by renderers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::parser::Language;

/// An import/use/include statement.
///
/// Imports are unresolved; the resolver maps them to files later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// The statement as written in source
    pub raw: String,
    /// Normalized module or path string (quotes and brackets stripped)
    pub module: String,
    /// Imported names (`*` for wildcard imports)
    pub names: Vec<String>,
    /// Line number (1-indexed)
    pub line: usize,
}

impl Import {
    /// Returns true if this import pulls in every name of the module.
    pub fn is_wildcard(&self) -> bool {
        self.names.iter().any(|n| n == "*")
    }
}

/// A function or method definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// The function's name
    pub name: String,

    /// Parameter list as written (including delimiters)
    pub parameters: String,

    /// Return type as written, without a leading `:` or `->`
    pub return_type: String,

    /// Documentation text, empty when absent
    pub doc: String,

    /// Starting line number (1-indexed)
    pub start_line: usize,

    /// Ending line number (1-indexed, inclusive)
    pub end_line: usize,

    /// Outgoing call names in first-seen order
    pub calls: Vec<String>,

    /// Whether this function is a method of a type
    pub is_method: bool,

    /// Whether the name marks it as private
    pub is_private: bool,

    /// Byte offset of the definition node; stable identity within one file
    #[serde(default, skip_serializing)]
    pub offset: usize,
}

impl Function {
    /// Create a function with the given name and line span.
    pub fn new(name: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            name: name.into(),
            parameters: String::new(),
            return_type: String::new(),
            doc: String::new(),
            start_line,
            end_line,
            calls: Vec::new(),
            is_method: false,
            is_private: false,
            offset: 0,
        }
    }

    /// Set the definition offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the call list.
    pub fn with_calls(mut self, calls: Vec<String>) -> Self {
        self.calls = calls;
        self
    }

    /// Mark as a method.
    pub fn as_method(mut self) -> Self {
        self.is_method = true;
        self
    }

    /// Render `name(params) -> ret` for display.
    pub fn signature(&self) -> String {
        let params = if self.parameters.is_empty() {
            "()"
        } else {
            self.parameters.as_str()
        };
        if self.return_type.is_empty() {
            format!("{}{}", self.name, params)
        } else {
            format!("{}{} -> {}", self.name, params, self.return_type)
        }
    }

    /// Returns the number of lines this function spans.
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Returns true if `other`'s line range lies within this one.
    pub fn contains_lines(&self, start_line: usize, end_line: usize) -> bool {
        self.start_line <= start_line && end_line <= self.end_line
    }
}

/// A class-like type definition (class, struct, trait, interface, impl block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// The type's name
    pub name: String,

    /// Base class / trait / interface name tokens
    pub bases: Vec<String>,

    /// Documentation text, empty when absent
    pub doc: String,

    /// Starting line number (1-indexed)
    pub start_line: usize,

    /// Ending line number (1-indexed, inclusive)
    pub end_line: usize,

    /// Methods owned by this class
    pub methods: Vec<Function>,

    /// Whether the name marks it as private
    pub is_private: bool,

    /// Byte offset of the definition node
    #[serde(default, skip_serializing)]
    pub offset: usize,
}

impl Class {
    /// Create a class with the given name and line span.
    pub fn new(name: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            doc: String::new(),
            start_line,
            end_line,
            methods: Vec::new(),
            is_private: false,
            offset: 0,
        }
    }

    /// Set the base names.
    pub fn with_bases(mut self, bases: Vec<String>) -> Self {
        self.bases = bases;
        self
    }

    /// Set the definition offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns true if the given line range lies within this class.
    pub fn contains_lines(&self, start_line: usize, end_line: usize) -> bool {
        self.start_line <= start_line && end_line <= self.end_line
    }

    /// Returns the number of lines this class spans.
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Find a method by name.
    pub fn method(&self, name: &str) -> Option<&Function> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path relative to the analysis root, `/`-separated
    pub path: String,
    /// Detected language, `None` for unrecognized extensions
    pub language: Option<Language>,
    pub imports: Vec<Import>,
    pub classes: Vec<Class>,
    /// Free (non-method) functions
    pub functions: Vec<Function>,
    /// Human-readable, file-local errors
    pub errors: Vec<String>,
}

impl FileInfo {
    /// Create an empty record for a file.
    pub fn new(path: impl Into<String>, language: Option<Language>) -> Self {
        Self {
            path: path.into(),
            language,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record a file-local error.
    pub fn push_error(&mut self, error: impl ToString) {
        self.errors.push(error.to_string());
    }

    /// Returns true if any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.classes.is_empty() && self.functions.is_empty()
    }

    /// Number of methods across all classes.
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }

    /// Language tag for display.
    pub fn language_tag(&self) -> &'static str {
        self.language.map(|l| l.tag()).unwrap_or("unknown")
    }
}

/// Whole-program relationship graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    /// File -> imported module strings
    pub imports: BTreeMap<String, Vec<String>>,
    /// File -> files it depends on
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Class name -> base names
    pub inheritance: BTreeMap<String, Vec<String>>,
    /// Qualified function name -> called names
    pub calls: BTreeMap<String, Vec<String>>,
    /// Function/method name -> defining files
    pub function_index: BTreeMap<String, Vec<String>>,
    /// Class name -> defining files
    pub class_index: BTreeMap<String, Vec<String>>,
}

impl Relationships {
    /// Files that `file` depends on.
    pub fn dependencies_of(&self, file: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(file)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Total number of dependency edges.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    /// Returns true if `name` is defined anywhere as a function, method or class.
    pub fn is_known_name(&self, name: &str) -> bool {
        self.function_index.contains_key(name) || self.class_index.contains_key(name)
    }

    /// The call graph restricted to callees defined inside the analyzed set.
    ///
    /// A callee is kept when it exactly matches a known definition name or is
    /// a substring of a defined function name or `Class.method` key. File
    /// paths never take part, so `app` does not match `app.py::main`. The
    /// substring rule favors recall and admits false positives on short names.
    pub fn internal_calls(&self) -> BTreeMap<String, Vec<String>> {
        self.calls
            .iter()
            .filter_map(|(caller, callees)| {
                let kept: Vec<String> = callees
                    .iter()
                    .filter(|callee| self.is_internal_callee(callee))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (caller.clone(), kept))
            })
            .collect()
    }

    fn is_internal_callee(&self, callee: &str) -> bool {
        self.is_known_name(callee)
            || self.function_index.keys().any(|name| name.contains(callee))
            || self
                .calls
                .keys()
                .filter(|key| !key.contains("::"))
                .any(|key| key.contains(callee))
    }
}

/// Statistics from a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Number of files processed (including unsupported ones).
    pub files_processed: usize,
    /// Number of files with at least one recorded error.
    pub files_with_errors: usize,
    pub imports: usize,
    pub classes: usize,
    pub functions: usize,
    pub methods: usize,
    /// Time spent in per-file extraction in milliseconds.
    pub extract_time_ms: u64,
    /// Time spent resolving relationships in milliseconds.
    pub resolve_time_ms: u64,
}

impl BuildStats {
    /// Account for one extracted file.
    pub fn record_file(&mut self, file: &FileInfo) {
        self.files_processed += 1;
        if file.has_errors() {
            self.files_with_errors += 1;
        }
        self.imports += file.imports.len();
        self.classes += file.classes.len();
        self.functions += file.functions.len();
        self.methods += file.method_count();
    }

    /// Merge another BuildStats into this one.
    pub fn merge(&mut self, other: &BuildStats) {
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.imports += other.imports;
        self.classes += other.classes;
        self.functions += other.functions;
        self.methods += other.methods;
        self.extract_time_ms += other.extract_time_ms;
        self.resolve_time_ms += other.resolve_time_ms;
    }
}

/// The result of analyzing a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub files: Vec<FileInfo>,
    pub relationships: Relationships,
    pub stats: BuildStats,
}

impl Analysis {
    /// Find a file record by relative path.
    pub fn file(&self, path: &str) -> Option<&FileInfo> {
        self.files.iter().find(|f| f.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_signature() {
        let mut f = Function::new("parse", 3, 9);
        f.parameters = "(path: &Path)".to_string();
        f.return_type = "Result<Config>".to_string();
        assert_eq!(f.signature(), "parse(path: &Path) -> Result<Config>");
        assert_eq!(f.line_count(), 7);

        let bare = Function::new("main", 1, 1);
        assert_eq!(bare.signature(), "main()");
    }

    #[test]
    fn test_class_contains_lines() {
        let class = Class::new("Greeter", 10, 30);
        assert!(class.contains_lines(10, 30));
        assert!(class.contains_lines(12, 14));
        assert!(!class.contains_lines(5, 12));
        assert!(!class.contains_lines(29, 31));
    }

    #[test]
    fn test_import_wildcard() {
        let import = Import {
            raw: "from os.path import *".to_string(),
            module: "os.path".to_string(),
            names: vec!["*".to_string()],
            line: 1,
        };
        assert!(import.is_wildcard());
    }

    #[test]
    fn test_internal_calls_filter() {
        let mut rel = Relationships::default();
        rel.calls.insert(
            "app.py::main".to_string(),
            vec!["helper".to_string(), "external_thing".to_string()],
        );
        rel.calls.insert("util.py::helper".to_string(), vec![]);
        rel.function_index
            .insert("main".to_string(), vec!["app.py".to_string()]);
        rel.function_index
            .insert("helper".to_string(), vec!["util.py".to_string()]);

        let internal = rel.internal_calls();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal["app.py::main"], vec!["helper".to_string()]);
    }

    #[test]
    fn test_internal_calls_substring_match() {
        let mut rel = Relationships::default();
        rel.calls
            .insert("a.py::run".to_string(), vec!["Widget".to_string()]);
        rel.calls.insert("Widget.render".to_string(), vec![]);

        // Not indexed by name, but a substring of a qualified key.
        let internal = rel.internal_calls();
        assert_eq!(internal["a.py::run"], vec!["Widget".to_string()]);
    }

    #[test]
    fn test_internal_calls_ignore_file_paths() {
        let mut rel = Relationships::default();
        rel.calls.insert(
            "app.py::main".to_string(),
            vec!["app".to_string(), "load".to_string()],
        );
        rel.calls.insert("loader.py::load_all".to_string(), vec![]);
        rel.function_index
            .insert("main".to_string(), vec!["app.py".to_string()]);
        rel.function_index
            .insert("load_all".to_string(), vec!["loader.py".to_string()]);

        // `load` is part of `load_all`; `app` only appears in a file path.
        let internal = rel.internal_calls();
        assert_eq!(internal["app.py::main"], vec!["load".to_string()]);
    }

    #[test]
    fn test_build_stats_record_and_merge() {
        let mut file = FileInfo::new("a.py", Some(Language::Python));
        file.functions.push(Function::new("f", 1, 2));
        let mut class = Class::new("A", 3, 8);
        class.methods.push(Function::new("m", 4, 5).as_method());
        file.classes.push(class);
        file.push_error("boom");

        let mut stats = BuildStats::default();
        stats.record_file(&file);
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_with_errors, 1);
        assert_eq!(stats.functions, 1);
        assert_eq!(stats.methods, 1);

        let mut total = BuildStats::default();
        total.merge(&stats);
        total.merge(&stats);
        assert_eq!(total.files_processed, 2);
        assert_eq!(total.classes, 2);
    }

    #[test]
    fn test_file_info_serialization_skips_offset() {
        let mut file = FileInfo::new("lib.rs", Some(Language::Rust));
        file.functions.push(Function::new("run", 1, 3).with_offset(42));

        let json = serde_json::to_string(&file).expect("serialize");
        assert!(!json.contains("offset"));
        assert!(json.contains("\"language\":\"rust\""));

        let back: FileInfo = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.functions[0].name, "run");
        assert_eq!(back.functions[0].offset, 0);
    }
}
