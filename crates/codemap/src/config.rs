//! Configuration file support for codemap.
//!
//! Settings live in a `.codemap/` directory:
//! - `.codemap/config.toml` - Configuration file
//! - `.codemap/logs/` - Log files when file logging is enabled
//!
//! Config discovery searches for `.codemap/config.toml` starting from the
//! current directory and walking up to parent directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use codemap_graph::{AnalysisOptions, DiscoveryOptions, Granularity};
use serde::{Deserialize, Serialize};

/// The codemap data directory name.
pub const CODEMAP_DIR: &str = ".codemap";
/// The config file name within the codemap directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Written by `codemap init`.
pub const DEFAULT_CONFIG: &str = r#"# codemap configuration
# All paths are relative to this .codemap/ directory unless absolute

[project]
root = ".."  # Parent directory (the actual project root)

[analysis]
include_private = false
include_docstrings = true
include_signatures = true
granularity = "detailed"  # Options: "file", "detailed"
# parallelism = 4  # Worker threads (default: available cores)

[discovery]
# Empty list = every file (unrecognized extensions are reported as unsupported)
extensions = ["py", "rs", "js", "jsx", "ts", "tsx", "go", "java", "c", "h", "cpp", "hpp", "cs", "rb", "php"]
ignore_patterns = [
    "__pycache__", "node_modules", ".git", ".svn", ".hg", "venv", ".venv", "env", ".env",
    "dist", "build", ".idea", ".vscode", "*.pyc", "*.pyo", "*.so", "*.dll", ".tox",
    ".pytest_cache", ".mypy_cache", "*.egg-info", "vendor", "target", "bin", "obj",
]
respect_gitignore = true
include_hidden = false
max_file_size = 1048576  # Bytes
max_depth = 10  # Directory levels below the project root

[output]
format = "markdown"  # Options: "markdown", "json"
# path = "codemap.md"  # Default: stdout
"#;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Project settings.
    pub project: ProjectConfig,
    /// Extraction settings.
    pub analysis: AnalysisConfig,
    /// File discovery settings.
    pub discovery: DiscoveryConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Project configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root directory of the project.
    pub root: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub include_private: bool,
    pub include_docstrings: bool,
    pub include_signatures: bool,
    /// "file" or "detailed".
    pub granularity: String,
    /// Worker threads; unset uses the available cores.
    pub parallelism: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let options = AnalysisOptions::default();
        Self {
            include_private: options.include_private,
            include_docstrings: options.include_docstrings,
            include_signatures: options.include_signatures,
            granularity: options.granularity.as_str().to_string(),
            parallelism: options.parallelism,
        }
    }
}

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Extensions to include; empty means every file.
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub respect_gitignore: bool,
    pub include_hidden: bool,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: Option<u64>,
    /// Deepest directory level walked below the root.
    pub max_depth: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let options = DiscoveryOptions::default();
        Self {
            extensions: options.extensions,
            ignore_patterns: options.ignore_patterns,
            respect_gitignore: options.respect_gitignore,
            include_hidden: options.include_hidden,
            max_file_size: options.max_file_size,
            max_depth: options.max_depth,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// "markdown" or "json".
    pub format: String,
    /// Output file; unset writes to stdout.
    pub path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "markdown".to_string(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Find and load configuration from current or parent directories.
    pub fn find_and_load() -> Result<Option<(Self, PathBuf)>> {
        let current = std::env::current_dir()?;
        Self::find_and_load_from(&current)
    }

    /// Find and load configuration starting from a specific directory.
    ///
    /// Looks for `.codemap/config.toml` in the directory and its parents and
    /// returns the config together with its `.codemap` directory.
    pub fn find_and_load_from(start: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start.to_path_buf();

        loop {
            let codemap_dir = dir.join(CODEMAP_DIR);
            let config_path = codemap_dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                return Ok(Some((config, codemap_dir)));
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Resolve the project root relative to the .codemap directory.
    pub fn resolve_root(&self, codemap_dir: Option<&Path>) -> PathBuf {
        match codemap_dir {
            Some(dir) if !self.project.root.is_absolute() => dir.join(&self.project.root),
            _ => self.project.root.clone(),
        }
    }

    /// Resolve the output path relative to the .codemap directory.
    pub fn resolve_output_path(&self, codemap_dir: Option<&Path>) -> Option<PathBuf> {
        let path = self.output.path.as_ref()?;
        Some(match codemap_dir {
            Some(dir) if !path.is_absolute() => dir.join(path),
            _ => path.clone(),
        })
    }

    /// Per-run extraction options.
    ///
    /// An invalid granularity string falls back to the default; `validate`
    /// reports it.
    pub fn analysis_options(&self) -> AnalysisOptions {
        let analysis = &self.analysis;
        let mut options = AnalysisOptions::default()
            .with_private(analysis.include_private)
            .with_docstrings(analysis.include_docstrings)
            .with_signatures(analysis.include_signatures)
            .with_granularity(analysis.granularity.parse().unwrap_or_default());
        if let Some(workers) = analysis.parallelism {
            options = options.with_parallelism(workers);
        }
        if !self.discovery.extensions.is_empty() {
            options = options.with_extensions(self.discovery.extensions.iter().cloned());
        }
        options
    }

    /// File discovery options.
    pub fn discovery_options(&self) -> DiscoveryOptions {
        let discovery = &self.discovery;
        DiscoveryOptions {
            extensions: discovery.extensions.clone(),
            ignore_patterns: discovery.ignore_patterns.clone(),
            respect_gitignore: discovery.respect_gitignore,
            include_hidden: discovery.include_hidden,
            max_file_size: discovery.max_file_size,
            max_depth: discovery.max_depth,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigValidationError {}

impl Config {
    /// Validate the configuration.
    ///
    /// Returns a list of validation errors if any are found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if let Err(message) = self.analysis.granularity.parse::<Granularity>() {
            errors.push(ConfigValidationError {
                field: "analysis.granularity".to_string(),
                message,
            });
        }

        if self.analysis.parallelism == Some(0) {
            errors.push(ConfigValidationError {
                field: "analysis.parallelism".to_string(),
                message: "Parallelism must be at least 1.".to_string(),
            });
        }

        if !["markdown", "json"].contains(&self.output.format.as_str()) {
            errors.push(ConfigValidationError {
                field: "output.format".to_string(),
                message: format!(
                    "Invalid format '{}'. Expected 'markdown' or 'json'.",
                    self.output.format
                ),
            });
        }

        if let Some(ext) = self
            .discovery
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            errors.push(ConfigValidationError {
                field: "discovery.extensions".to_string(),
                message: format!("Invalid extension '{ext}'. Use bare extensions like \"py\"."),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.root, PathBuf::from("."));
        assert_eq!(config.analysis.granularity, "detailed");
        assert!(!config.analysis.include_private);
        assert_eq!(config.output.format, "markdown");
        assert!(config.discovery.extensions.iter().any(|e| e == "py"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[analysis]
include_private = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.analysis.include_private);
        // Defaults should still apply
        assert!(config.analysis.include_docstrings);
        assert_eq!(config.output.format, "markdown");
        assert_eq!(config.discovery_options().max_depth, Some(10));
    }

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.project.root, PathBuf::from(".."));
        assert_eq!(config.discovery.max_file_size, Some(1_048_576));
        assert_eq!(config.discovery.max_depth, Some(10));
        assert_eq!(
            config.discovery.ignore_patterns,
            DiscoveryOptions::default().ignore_patterns
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[project]
root = "/home/user/myproject"

[analysis]
include_private = true
include_docstrings = false
include_signatures = false
granularity = "file"
parallelism = 2

[discovery]
extensions = ["rs", "py"]
ignore_patterns = ["vendor"]
respect_gitignore = false
include_hidden = true
max_depth = 3

[output]
format = "json"
path = "map.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.project.root, PathBuf::from("/home/user/myproject"));

        let options = config.analysis_options();
        assert!(options.include_private);
        assert!(!options.include_docstrings);
        assert!(!options.include_signatures);
        assert_eq!(options.granularity, Granularity::File);
        assert_eq!(options.parallelism, Some(2));
        assert_eq!(options.extensions, vec!["rs", "py"]);

        let discovery = config.discovery_options();
        assert_eq!(discovery.extensions, vec!["rs", "py"]);
        assert_eq!(discovery.ignore_patterns, vec!["vendor"]);
        assert!(!discovery.respect_gitignore);
        assert!(discovery.include_hidden);
        assert_eq!(discovery.max_depth, Some(3));

        assert_eq!(config.output.format, "json");
        assert_eq!(config.output.path, Some(PathBuf::from("map.json")));
    }

    #[test]
    fn test_empty_extensions_keep_default_resolution() {
        let toml = r#"
[discovery]
extensions = []
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.discovery_options().extensions.is_empty());
        assert!(config.analysis_options().extensions.iter().any(|e| e == "rs"));
    }

    #[test]
    fn test_resolve_paths() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let codemap_dir = PathBuf::from("/project/.codemap");
        assert_eq!(
            config.resolve_root(Some(&codemap_dir)),
            PathBuf::from("/project/.codemap/..")
        );
        assert_eq!(config.resolve_root(None), PathBuf::from(".."));
        assert_eq!(config.resolve_output_path(Some(&codemap_dir)), None);

        let mut config = config;
        config.output.path = Some(PathBuf::from("map.md"));
        assert_eq!(
            config.resolve_output_path(Some(&codemap_dir)),
            Some(PathBuf::from("/project/.codemap/map.md"))
        );
    }

    #[test]
    fn test_find_and_load_walks_up() {
        let dir = tempdir().unwrap();
        let codemap_dir = dir.path().join(CODEMAP_DIR);
        std::fs::create_dir_all(&codemap_dir).unwrap();
        std::fs::write(
            codemap_dir.join(CONFIG_FILE),
            "[output]\nformat = \"json\"\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, found) = Config::find_and_load_from(&nested).unwrap().unwrap();
        assert_eq!(config.output.format, "json");
        assert_eq!(found, codemap_dir);
    }

    #[test]
    fn test_validate_invalid_values() {
        let mut config = Config::default();
        config.analysis.granularity = "module".to_string();
        config.analysis.parallelism = Some(0);
        config.output.format = "html".to_string();
        config.discovery.extensions = vec![".py".to_string()];

        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "analysis.granularity",
                "analysis.parallelism",
                "output.format",
                "discovery.extensions"
            ]
        );
    }
}
