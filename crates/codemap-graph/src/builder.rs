//! Graph builder for analyzing a set of source files.
//!
//! This module coordinates parsing, extraction and relationship resolution.
//! Per-file work runs on a rayon pool with one parser per worker; resolution
//! waits for every file to finish.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::discovery::{DiscoveryError, DiscoveryOptions, SourceFile, discover};
use crate::extractor::Extractor;
use crate::lang::QueryCatalog;
use crate::model::{Analysis, BuildStats, FileInfo};
use crate::options::AnalysisOptions;
use crate::parser::{ExtractError, Language, Parser};
use crate::resolver::resolve;

/// Error type for graph building operations.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Coordinates parsing, extraction and resolution.
///
/// Owns the per-run options and the compiled query catalog; both are shared
/// read-only across workers.
pub struct GraphBuilder {
    options: AnalysisOptions,
    catalog: QueryCatalog,
}

impl GraphBuilder {
    /// Create a new GraphBuilder with the given options.
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            catalog: QueryCatalog::new(),
        }
    }

    /// The options this builder runs with.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Extract one in-memory source.
    pub fn analyze_source(&self, path: &str, language: Language, source: &str) -> FileInfo {
        let mut parser = Parser::new();
        self.analyze_with(&mut parser, path, language, source)
    }

    /// Read and extract one discovered file.
    ///
    /// Never fails: unsupported and unreadable files come back with empty
    /// entities and a recorded error.
    pub fn analyze_file(&self, parser: &mut Parser, file: &SourceFile) -> FileInfo {
        let Some(language) = file.language else {
            let ext = file
                .path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none");
            debug!(path = %file.relative_path, "Unsupported file");
            let mut info = FileInfo::new(file.relative_path.as_str(), None);
            info.push_error(ExtractError::Unsupported(ext.to_string()));
            return info;
        };

        match std::fs::read(&file.path) {
            Ok(bytes) => {
                let source = String::from_utf8_lossy(&bytes);
                self.analyze_with(parser, &file.relative_path, language, &source)
            }
            Err(e) => {
                warn!(path = %file.relative_path, "Failed to read file: {e}");
                let mut info = FileInfo::new(file.relative_path.as_str(), Some(language));
                info.push_error(ExtractError::Unreadable(e));
                info
            }
        }
    }

    fn analyze_with(
        &self,
        parser: &mut Parser,
        path: &str,
        language: Language,
        source: &str,
    ) -> FileInfo {
        let parsed = match parser.parse_source(source, language) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(path, "{e}");
                let mut info = FileInfo::new(path, Some(language));
                info.push_error(e);
                return info;
            }
        };

        let info = Extractor::new(&self.catalog, &self.options).extract(&parsed, path);
        if info.has_errors() {
            warn!(path, errors = ?info.errors, "Extracted with errors");
        } else {
            debug!(
                path,
                imports = info.imports.len(),
                classes = info.classes.len(),
                functions = info.functions.len(),
                "Extracted file"
            );
        }
        info
    }

    /// Extract every file and resolve relationships.
    ///
    /// Output order equals input order.
    pub fn build(&self, files: &[SourceFile]) -> Analysis {
        let extract_start = Instant::now();
        let records = match self.options.parallelism {
            Some(workers) => match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(|| self.extract_all(files)),
                Err(e) => {
                    warn!("Falling back to the global thread pool: {e}");
                    self.extract_all(files)
                }
            },
            None => self.extract_all(files),
        };
        let extract_time_ms = extract_start.elapsed().as_millis() as u64;

        let resolve_start = Instant::now();
        let relationships = resolve(&records, &self.options);
        let resolve_time_ms = resolve_start.elapsed().as_millis() as u64;

        let mut stats = BuildStats::default();
        for record in &records {
            stats.record_file(record);
        }
        stats.extract_time_ms = extract_time_ms;
        stats.resolve_time_ms = resolve_time_ms;

        info!(
            files = stats.files_processed,
            with_errors = stats.files_with_errors,
            classes = stats.classes,
            functions = stats.functions + stats.methods,
            dependencies = relationships.dependency_count(),
            extract_ms = extract_time_ms,
            resolve_ms = resolve_time_ms,
            "Build complete"
        );

        Analysis {
            files: records,
            relationships,
            stats,
        }
    }

    fn extract_all(&self, files: &[SourceFile]) -> Vec<FileInfo> {
        files
            .par_iter()
            .map_init(Parser::new, |parser, file| self.analyze_file(parser, file))
            .collect()
    }

    /// Discover files under `root` and build them.
    pub fn build_directory(&self, root: &Path, discovery: &DiscoveryOptions) -> Result<Analysis> {
        let files = discover(root, discovery)?;
        info!(root = %root.display(), files = files.len(), "Analyzing directory");
        Ok(self.build(&files))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}
