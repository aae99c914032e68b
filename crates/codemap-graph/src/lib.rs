//! codemap-graph: polyglot structural extraction
//!
//! This crate turns source trees into a uniform structural model:
//! - Language detection and tree-sitter parsing
//! - Query-driven extraction of imports, classes, functions and calls
//! - Method-to-class association
//! - Heuristic resolution of file dependencies, inheritance and call graphs

pub mod association;
pub mod builder;
pub mod calls;
pub mod discovery;
pub mod docstring;
pub mod extractor;
pub mod lang;
pub mod model;
pub mod options;
pub mod parser;
pub mod resolver;

pub use association::associate_methods;
pub use builder::{BuildError, GraphBuilder};
pub use discovery::{DiscoveryError, DiscoveryOptions, SourceFile, discover};
pub use extractor::Extractor;
pub use lang::{QueryCatalog, QueryCategory, definition_kinds, query_for};
pub use model::{Analysis, BuildStats, Class, FileInfo, Function, Import, Relationships};
pub use options::{AnalysisOptions, Granularity, MAX_CALLS, MAX_DOC_CHARS};
pub use parser::{DocStyle, ExtractError, Language, ParsedFile, Parser};
pub use resolver::{candidate_patterns, resolve};
