//! Tree-sitter based multi-language parser.
//!
//! This module provides language detection and the parsing infrastructure the
//! extractor runs its queries against. Errors raised here and in the
//! extractor are file-local: they end up as strings on a `FileInfo`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File-local extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file extension: {0}")]
    Unsupported(String),

    #[error("Parser unavailable for {language}: {reason}")]
    ParserUnavailable {
        language: &'static str,
        reason: String,
    },

    #[error("Failed to parse source: {0}")]
    ParseFailure(String),

    #[error("Query failure ({language} {category}): {reason}")]
    QueryFailure {
        language: &'static str,
        category: &'static str,
        reason: String,
    },

    #[error("Failed to read file: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// Supported programming languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
    C,
    Cpp,
    JavaScript,
    TypeScript,
    Tsx,
    Go,
    Java,
    CSharp,
    Ruby,
    Php,
    Bash,
}

/// How a language attaches documentation to definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStyle {
    /// A bare string literal as the first statement of the body
    BodyString,
    /// Comment nodes immediately preceding the definition
    LeadingComment,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 13] = [
        Language::Python,
        Language::Rust,
        Language::C,
        Language::Cpp,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
        Language::Go,
        Language::Java,
        Language::CSharp,
        Language::Ruby,
        Language::Php,
        Language::Bash,
    ];

    /// Detect language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Detect language from file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Look a language up by its tag (`"python"`, `"cpp"`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.tag() == tag)
    }

    /// Get the tree-sitter language for this language.
    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
            Language::Bash => tree_sitter_bash::LANGUAGE.into(),
        }
    }

    /// Get file extensions associated with this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py", "pyi"],
            Language::Rust => &["rs"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx", "h++"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "mts", "cts"],
            Language::Tsx => &["tsx"],
            Language::Go => &["go"],
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
            Language::Ruby => &["rb"],
            Language::Php => &["php"],
            Language::Bash => &["sh", "bash"],
        }
    }

    /// Get the display name for this language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Rust => "Rust",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Bash => "Bash",
        }
    }

    /// Get the lowercase tag used in serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Go => "go",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Bash => "bash",
        }
    }

    /// How this language documents its definitions.
    pub fn doc_style(&self) -> DocStyle {
        match self {
            Language::Python => DocStyle::BodyString,
            _ => DocStyle::LeadingComment,
        }
    }

    /// Get all supported extensions.
    pub fn all_extensions() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .flat_map(|lang| lang.extensions().iter().copied())
            .collect()
    }
}

/// A parsed source file with its syntax tree.
pub struct ParsedFile {
    /// The language of the source file.
    pub language: Language,
    /// The tree-sitter syntax tree.
    pub tree: tree_sitter::Tree,
    /// The source code (owned for lifetime management).
    pub source: String,
}

impl ParsedFile {
    /// Get the root node of the syntax tree.
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Get the source code as bytes.
    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    /// Get text for a node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }

    /// Returns true if the tree contains syntax errors.
    pub fn has_syntax_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Multi-language source code parser.
///
/// Wraps one tree-sitter parser and switches its grammar per call. Not
/// shared across threads; the builder creates one per worker.
pub struct Parser {
    ts_parser: tree_sitter::Parser,
}

impl Parser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self {
            ts_parser: tree_sitter::Parser::new(),
        }
    }

    /// Parse a file from the filesystem.
    pub fn parse_file(&mut self, path: &Path) -> Result<ParsedFile, ExtractError> {
        let language = Language::from_path(path).ok_or_else(|| {
            ExtractError::Unsupported(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            )
        })?;

        let bytes = std::fs::read(path)?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        self.parse_source(&source, language)
    }

    /// Parse source code string with a specified language.
    pub fn parse_source(
        &mut self,
        source: &str,
        language: Language,
    ) -> Result<ParsedFile, ExtractError> {
        self.ts_parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ExtractError::ParserUnavailable {
                language: language.name(),
                reason: e.to_string(),
            })?;

        let tree = self.ts_parser.parse(source, None).ok_or_else(|| {
            ExtractError::ParseFailure(format!("{} parser produced no tree", language.name()))
        })?;

        Ok(ParsedFile {
            language,
            tree,
            source: source.to_string(),
        })
    }

    /// Check if a file extension is supported.
    pub fn supports_extension(ext: &str) -> bool {
        Language::from_extension(ext).is_some()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
