//! Per-run analysis options.
//!
//! One `AnalysisOptions` value is built per run and passed explicitly to the
//! extractor, the resolver and the builder. Nothing here is global.

use serde::{Deserialize, Serialize};

use crate::parser::Language;

/// Maximum number of call names kept per function.
pub const MAX_CALLS: usize = 20;

/// Maximum number of characters of doc text kept before truncation.
pub const MAX_DOC_CHARS: usize = 200;

/// How much structure to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Imports and file dependencies only
    File,
    /// Imports, classes, functions and calls
    #[default]
    Detailed,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::File => "file",
            Granularity::Detailed => "detailed",
        }
    }

    /// Returns true if classes, functions and calls are computed.
    pub fn is_detailed(&self) -> bool {
        matches!(self, Granularity::Detailed)
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Granularity::File),
            "detailed" => Ok(Granularity::Detailed),
            other => Err(format!(
                "Invalid granularity '{other}'. Expected 'file' or 'detailed'."
            )),
        }
    }
}

/// Options controlling extraction and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Keep `_private` classes, functions and methods.
    pub include_private: bool,
    /// Extract doc text.
    pub include_docstrings: bool,
    /// Extract parameter and return-type text.
    pub include_signatures: bool,
    /// Extraction depth.
    pub granularity: Granularity,
    /// Extensions tried when resolving imports to files.
    pub extensions: Vec<String>,
    /// Worker count for per-file extraction (`None` = available parallelism).
    pub parallelism: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_private: false,
            include_docstrings: true,
            include_signatures: true,
            granularity: Granularity::Detailed,
            extensions: Language::all_extensions()
                .into_iter()
                .map(str::to_string)
                .collect(),
            parallelism: None,
        }
    }
}

impl AnalysisOptions {
    /// Set whether private entities are kept.
    pub fn with_private(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    /// Set whether doc text is extracted.
    pub fn with_docstrings(mut self, include: bool) -> Self {
        self.include_docstrings = include;
        self
    }

    /// Set whether signatures are extracted.
    pub fn with_signatures(mut self, include: bool) -> Self {
        self.include_signatures = include;
        self
    }

    /// Set the extraction granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set the extensions used for import resolution.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the worker count.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers.max(1));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert!(!options.include_private);
        assert!(options.include_docstrings);
        assert!(options.include_signatures);
        assert_eq!(options.granularity, Granularity::Detailed);
        assert!(options.extensions.iter().any(|e| e == "py"));
        assert!(options.extensions.iter().any(|e| e == "rs"));
        assert_eq!(options.parallelism, None);
    }

    #[test]
    fn test_builder_methods() {
        let options = AnalysisOptions::default()
            .with_private(true)
            .with_docstrings(false)
            .with_granularity(Granularity::File)
            .with_extensions(["py"])
            .with_parallelism(0);
        assert!(options.include_private);
        assert!(!options.include_docstrings);
        assert_eq!(options.granularity, Granularity::File);
        assert_eq!(options.extensions, vec!["py".to_string()]);
        assert_eq!(options.parallelism, Some(1));
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("file".parse::<Granularity>(), Ok(Granularity::File));
        assert_eq!("Detailed".parse::<Granularity>(), Ok(Granularity::Detailed));
        assert!("module".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"include_private": true, "granularity": "file"}"#)
                .expect("deserialize");
        assert!(options.include_private);
        assert!(options.include_docstrings);
        assert_eq!(options.granularity, Granularity::File);
    }
}
