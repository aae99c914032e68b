//! Source file discovery.
//!
//! Walks a directory tree with `ignore`, honoring `.gitignore`, hidden-file
//! rules, extra ignore globs, an extension allow-list, a directory depth
//! limit and a size limit.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use tracing::{debug, warn};

use crate::parser::Language;

/// Error type for discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Root directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated
    pub relative_path: String,
    /// Detected language, `None` when the extension is not recognized
    pub language: Option<Language>,
}

/// Options for discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Extensions to include; empty means every file.
    pub extensions: Vec<String>,
    /// Additional gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,
    /// Whether to walk hidden files and directories.
    pub include_hidden: bool,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: Option<u64>,
    /// Deepest directory level to descend into; files directly under the
    /// root sit at level 0. `None` walks the whole tree.
    pub max_depth: Option<usize>,
}

/// Directory and file globs skipped unless the caller overrides them.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "__pycache__",
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "venv",
    ".venv",
    "env",
    ".env",
    "dist",
    "build",
    ".idea",
    ".vscode",
    "*.pyc",
    "*.pyo",
    "*.so",
    "*.dll",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    "*.egg-info",
    "vendor",
    "target",
    "bin",
    "obj",
];

/// Default for [`DiscoveryOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 10;

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: Language::all_extensions()
                .into_iter()
                .map(str::to_string)
                .collect(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: Some(1024 * 1024),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl DiscoveryOptions {
    /// Set the extension allow-list (empty = every file).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Accept every file regardless of extension.
    pub fn all_files(self) -> Self {
        self.with_extensions(Vec::<String>::new())
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Discover files under `root`, sorted by relative path.
///
/// Unreadable entries are logged and skipped; only a missing root is fatal.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
    }

    let mut overrides = OverrideBuilder::new(root);
    for pattern in &options.ignore_patterns {
        if let Err(e) = overrides.add(&format!("!{pattern}")) {
            warn!(pattern = %pattern, "Skipping invalid ignore pattern: {e}");
        }
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .require_git(false)
        // The walker counts the root itself as depth 0, so a file in a
        // level-N directory is entry depth N + 1.
        .max_depth(options.max_depth.map(|depth| depth + 1))
        .overrides(overrides.build()?);

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if !options.accepts_extension(path) {
            continue;
        }
        if let Some(limit) = options.max_file_size {
            if let Ok(meta) = entry.metadata() {
                if meta.len() > limit {
                    debug!(
                        "Skipping large file {} ({} bytes > {limit})",
                        path.display(),
                        meta.len()
                    );
                    continue;
                }
            }
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            relative_path: relative_path(root, path),
            language: Language::from_path(path),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    debug!(root = %root.display(), count = files.len(), "Discovered files");
    Ok(files)
}

/// `path` relative to `root`, always `/`-separated.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write file");
    }

    fn relative_paths(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn test_discover_sorted_with_languages() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "src/main.rs", "fn main() {}");
        write(dir.path(), "app.py", "pass");
        write(dir.path(), "README.md", "# readme");

        let files = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(relative_paths(&files), vec!["app.py", "src/main.rs"]);
        assert_eq!(files[0].language, Some(Language::Python));
        assert_eq!(files[1].language, Some(Language::Rust));
    }

    #[test]
    fn test_empty_allow_list_includes_everything() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "notes.txt", "hello");
        write(dir.path(), "lib.rs", "");

        let files = discover(dir.path(), &DiscoveryOptions::default().all_files()).unwrap();
        assert_eq!(relative_paths(&files), vec!["lib.rs", "notes.txt"]);
        assert_eq!(files[1].language, None);
    }

    #[test]
    fn test_gitignore_and_hidden() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), ".gitignore", "generated/\n");
        write(dir.path(), "generated/out.py", "x = 1");
        write(dir.path(), ".hidden/secret.py", "x = 1");
        write(dir.path(), "kept.py", "x = 1");

        let files = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(relative_paths(&files), vec!["kept.py"]);

        let options = DiscoveryOptions {
            respect_gitignore: false,
            include_hidden: true,
            ..DiscoveryOptions::default()
        };
        let files = discover(dir.path(), &options).unwrap();
        assert_eq!(
            relative_paths(&files),
            vec![".hidden/secret.py", "generated/out.py", "kept.py"]
        );
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "node_modules/pkg/index.js", "");
        write(dir.path(), "target/debug/build.rs", "");
        write(dir.path(), "web/app.js", "");
        write(dir.path(), "web/app.test.js", "");

        let mut options = DiscoveryOptions::default();
        options.ignore_patterns.push("*.test.js".to_string());
        let files = discover(dir.path(), &options).unwrap();
        assert_eq!(relative_paths(&files), vec!["web/app.js"]);
    }

    #[test]
    fn test_default_ignores_cover_build_and_env_dirs() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "build/gen.py", "");
        write(dir.path(), "venv/lib/site.py", "");
        write(dir.path(), "vendor/dep/lib.go", "");
        write(dir.path(), "pkg/native.so", "");
        write(dir.path(), "pkg/core.py", "");

        let files = discover(dir.path(), &DiscoveryOptions::default().all_files()).unwrap();
        assert_eq!(relative_paths(&files), vec!["pkg/core.py"]);
    }

    #[test]
    fn test_max_depth() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "top.py", "");
        write(dir.path(), "a/one.py", "");
        write(dir.path(), "a/b/two.py", "");
        write(dir.path(), "a/b/c/three.py", "");

        let depth = |max_depth| DiscoveryOptions {
            max_depth,
            ..DiscoveryOptions::default()
        };

        let files = discover(dir.path(), &depth(Some(0))).unwrap();
        assert_eq!(relative_paths(&files), vec!["top.py"]);

        let files = discover(dir.path(), &depth(Some(1))).unwrap();
        assert_eq!(relative_paths(&files), vec!["a/one.py", "top.py"]);

        let files = discover(dir.path(), &depth(None)).unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(DiscoveryOptions::default().max_depth, Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn test_max_file_size() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "big.py", &"x = 1\n".repeat(100));
        write(dir.path(), "small.py", "x = 1\n");

        let options = DiscoveryOptions {
            max_file_size: Some(64),
            ..DiscoveryOptions::default()
        };
        let files = discover(dir.path(), &options).unwrap();
        assert_eq!(relative_paths(&files), vec!["small.py"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let err = discover(&missing, &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingRoot(_)));
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(
            relative_path(root, &Path::new("/repo").join("src").join("lib.rs")),
            "src/lib.rs"
        );
    }
}
