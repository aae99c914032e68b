//! Whole-program relationship resolution.
//!
//! Runs after every file has been extracted. Three independent passes build
//! the inheritance graph, the call graph and the file dependency graph.
//! Resolution is heuristic: import strings are turned into candidate paths
//! and a file is a dependency when its path ends with or contains any
//! candidate. Files sharing a suffix cannot be told apart.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{FileInfo, Import, Relationships};
use crate::options::AnalysisOptions;

/// Build the relationship graph for a complete set of file records.
pub fn resolve(files: &[FileInfo], options: &AnalysisOptions) -> Relationships {
    let mut relationships = Relationships::default();

    index_definitions(files, &mut relationships);
    build_inheritance(files, &mut relationships);
    build_call_graph(files, &mut relationships);
    build_dependencies(files, &options.extensions, &mut relationships);

    debug!(
        files = files.len(),
        dependencies = relationships.dependency_count(),
        classes = relationships.inheritance.len(),
        callers = relationships.calls.len(),
        "Resolved relationships"
    );

    relationships
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn index_definitions(files: &[FileInfo], rel: &mut Relationships) {
    for file in files {
        let modules = rel.imports.entry(file.path.clone()).or_default();
        for import in &file.imports {
            push_unique(modules, &import.module);
        }

        for class in &file.classes {
            push_unique(rel.class_index.entry(class.name.clone()).or_default(), &file.path);
            for method in &class.methods {
                push_unique(
                    rel.function_index.entry(method.name.clone()).or_default(),
                    &file.path,
                );
            }
        }
        for function in &file.functions {
            push_unique(
                rel.function_index.entry(function.name.clone()).or_default(),
                &file.path,
            );
        }
    }
    rel.imports.retain(|_, modules| !modules.is_empty());
}

/// Class name -> base names. Same-named classes merge their bases.
fn build_inheritance(files: &[FileInfo], rel: &mut Relationships) {
    for class in files.iter().flat_map(|f| &f.classes) {
        if class.bases.is_empty() {
            continue;
        }
        let bases = rel.inheritance.entry(class.name.clone()).or_default();
        for base in &class.bases {
            push_unique(bases, base);
        }
    }
}

/// `file::name` for free functions, `Class.method` for methods.
fn build_call_graph(files: &[FileInfo], rel: &mut Relationships) {
    for file in files {
        for function in &file.functions {
            let callees = rel
                .calls
                .entry(format!("{}::{}", file.path, function.name))
                .or_default();
            for callee in &function.calls {
                push_unique(callees, callee);
            }
        }
        for class in &file.classes {
            for method in &class.methods {
                let callees = rel
                    .calls
                    .entry(format!("{}.{}", class.name, method.name))
                    .or_default();
                for callee in &method.calls {
                    push_unique(callees, callee);
                }
            }
        }
    }
}

fn build_dependencies(files: &[FileInfo], extensions: &[String], rel: &mut Relationships) {
    for file in files {
        let candidates: Vec<String> = file
            .imports
            .iter()
            .flat_map(|import| import_candidates(import, extensions))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let deps: BTreeSet<String> = files
            .iter()
            .filter(|other| other.path != file.path)
            .filter(|other| {
                candidates
                    .iter()
                    .any(|candidate| matches_candidate(&other.path, candidate))
            })
            .map(|other| other.path.clone())
            .collect();
        if !deps.is_empty() {
            rel.dependencies.insert(file.path.clone(), deps);
        }
    }
}

/// `path` ends with `candidate`, or contains it anywhere.
///
/// The containment rule is loose on purpose: `net.py` also matches
/// `vendor/subnet.py` and `mynet.py`.
fn matches_candidate(path: &str, candidate: &str) -> bool {
    path.ends_with(candidate) || path.contains(candidate)
}

/// Candidate paths for an import: its module, plus `module/name` for every
/// imported name.
fn import_candidates(import: &Import, extensions: &[String]) -> Vec<String> {
    let mut candidates = candidate_patterns(&import.module, extensions);
    if has_extension(&import.module, extensions) {
        return candidates;
    }

    let base = module_path(&import.module);
    for name in import.names.iter().filter(|n| *n != "*") {
        let path = if base.is_empty() {
            module_path(name)
        } else {
            format!("{base}/{}", module_path(name))
        };
        for candidate in path_candidates(&path, extensions) {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Candidate relative paths a module string may refer to.
///
/// A module that already ends in a known extension is its own single
/// candidate; otherwise it is turned into a path and combined with every
/// extension as `<p>.<ext>`, `<p>/index.<ext>`, `<p>/__init__.<ext>` and
/// `<p>/mod.<ext>`.
pub fn candidate_patterns(module: &str, extensions: &[String]) -> Vec<String> {
    let module = module.trim();
    if module.is_empty() {
        return Vec::new();
    }
    if has_extension(module, extensions) {
        let path = strip_relative(module).trim_start_matches('/');
        return if path.is_empty() {
            Vec::new()
        } else {
            vec![path.to_string()]
        };
    }
    path_candidates(&module_path(module), extensions)
}

fn path_candidates(path: &str, extensions: &[String]) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut candidates = Vec::with_capacity(extensions.len() * 4);
    for ext in extensions {
        candidates.push(format!("{path}.{ext}"));
        candidates.push(format!("{path}/index.{ext}"));
        candidates.push(format!("{path}/__init__.{ext}"));
        candidates.push(format!("{path}/mod.{ext}"));
    }
    candidates
}

fn has_extension(module: &str, extensions: &[String]) -> bool {
    module.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && !stem.ends_with('.')
            && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    })
}

/// Strip `./` and `../` prefixes.
fn strip_relative(module: &str) -> &str {
    let mut rest = module;
    loop {
        if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("../") {
            rest = r;
        } else {
            return rest;
        }
    }
}

/// Turn a module string into a `/`-separated path.
///
/// Relative prefixes (`./`, `../`, leading dots, `crate::`, `self::`,
/// `super::`) are dropped. Strings that already contain `/` are kept as
/// paths; otherwise `::`, `\` and `.` become `/`.
fn module_path(module: &str) -> String {
    let mut rest = strip_relative(module.trim()).trim_start_matches('.');
    loop {
        let stripped = ["crate::", "self::", "super::"]
            .iter()
            .find_map(|prefix| rest.strip_prefix(prefix));
        match stripped {
            Some(r) => rest = r,
            None => break,
        }
    }
    if matches!(rest, "crate" | "self" | "super") {
        return String::new();
    }

    let path = if rest.contains('/') {
        rest.to_string()
    } else {
        rest.replace("::", "/").replace('\\', "/").replace('.', "/")
    };
    path.trim_matches('/').to_string()
}
