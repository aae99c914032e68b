//! Markdown and JSON rendering of an analysis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use anyhow::Result;
use codemap_graph::{Analysis, Class, FileInfo, Function};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Markdown,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Format::Markdown),
            "json" => Ok(Format::Json),
            other => Err(format!(
                "Invalid format '{other}'. Expected 'markdown' or 'json'."
            )),
        }
    }
}

/// Render `analysis` in the requested format.
///
/// `root_name` heads the project structure tree.
pub fn render(analysis: &Analysis, format: Format, root_name: &str) -> Result<String> {
    match format {
        Format::Markdown => Ok(render_markdown(analysis, root_name)),
        Format::Json => Ok(serde_json::to_string_pretty(analysis)?),
    }
}

/// Render a human-readable Markdown report.
pub fn render_markdown(analysis: &Analysis, root_name: &str) -> String {
    let mut out = String::new();
    let stats = &analysis.stats;
    let relationships = &analysis.relationships;

    let deps: Vec<_> = relationships
        .dependencies
        .iter()
        .filter(|(_, targets)| !targets.is_empty())
        .collect();
    let internal = relationships.internal_calls();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# Code Map\n");
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "- Files: {}", stats.files_processed);
    let _ = writeln!(out, "- Imports: {}", stats.imports);
    let _ = writeln!(out, "- Classes: {}", stats.classes);
    let _ = writeln!(out, "- Functions: {}", stats.functions);
    let _ = writeln!(out, "- Methods: {}", stats.methods);
    let _ = writeln!(out, "- Dependencies: {}", relationships.dependency_count());
    let _ = writeln!(out, "- Files with errors: {}", stats.files_with_errors);

    let mut sections = vec!["Project Structure", "Files"];
    if !deps.is_empty() {
        sections.push("File Dependencies");
    }
    if !relationships.inheritance.is_empty() {
        sections.push("Inheritance");
    }
    if !internal.is_empty() {
        sections.push("Call Graph");
    }
    let _ = writeln!(out, "\n## Table of Contents\n");
    for section in sections {
        let _ = writeln!(out, "- [{section}](#{})", anchor(section));
    }

    let _ = writeln!(out, "\n## Project Structure\n");
    let _ = writeln!(out, "```");
    let _ = writeln!(out, "{root_name}/");
    let mut tree = Tree::default();
    for file in &analysis.files {
        tree.insert(&file.path);
    }
    tree.render(&mut out, "");
    let _ = writeln!(out, "```");

    let _ = writeln!(out, "\n## Files");
    for file in &analysis.files {
        render_file(&mut out, file);
    }

    if !deps.is_empty() {
        let _ = writeln!(out, "\n## File Dependencies\n");
        for (file, targets) in deps {
            let targets: Vec<_> = targets.iter().map(|t| format!("`{t}`")).collect();
            let _ = writeln!(out, "- `{file}` -> {}", targets.join(", "));
        }
    }

    if !relationships.inheritance.is_empty() {
        let _ = writeln!(out, "\n## Inheritance\n");
        let _ = writeln!(out, "```mermaid\ngraph TD");
        for (class, bases) in &relationships.inheritance {
            for base in bases {
                let _ = writeln!(out, "    {base} --> {class}");
            }
        }
        let _ = writeln!(out, "```\n");
        for (class, bases) in &relationships.inheritance {
            let _ = writeln!(out, "- `{class}` extends {}", code_list(bases));
        }
    }

    if !internal.is_empty() {
        let _ = writeln!(out, "\n## Call Graph\n");
        for (caller, callees) in &internal {
            let _ = writeln!(out, "- `{caller}` calls {}", code_list(callees));
        }
    }

    out
}

/// GitHub-style heading anchor.
fn anchor(heading: &str) -> String {
    heading.to_lowercase().replace(' ', "-")
}

/// Directory tree of the analyzed files. Directories list before files.
#[derive(Default)]
struct Tree {
    dirs: BTreeMap<String, Tree>,
    files: BTreeSet<String>,
}

impl Tree {
    fn insert(&mut self, path: &str) {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };
        let mut node = self;
        for dir in parts {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.insert(file.to_string());
    }

    fn render(&self, out: &mut String, prefix: &str) {
        let entries: Vec<(String, Option<&Tree>)> = self
            .dirs
            .iter()
            .map(|(name, tree)| (format!("{name}/"), Some(tree)))
            .chain(self.files.iter().map(|name| (name.clone(), None)))
            .collect();
        let count = entries.len();
        for (i, (name, child)) in entries.into_iter().enumerate() {
            let last = i + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            let _ = writeln!(out, "{prefix}{connector}{name}");
            if let Some(child) = child {
                let extension = if last { "    " } else { "│   " };
                child.render(out, &format!("{prefix}{extension}"));
            }
        }
    }
}

fn render_file(out: &mut String, file: &FileInfo) {
    let _ = writeln!(out, "\n### `{}` ({})", file.path, file.language_tag());

    if !file.imports.is_empty() {
        let _ = writeln!(out, "\n**Imports:**");
        for import in &file.imports {
            if import.names.is_empty() {
                let _ = writeln!(out, "- `{}`", import.module);
            } else {
                let _ = writeln!(
                    out,
                    "- `{}`: {}",
                    import.module,
                    code_list(&import.names)
                );
            }
        }
    }

    if !file.classes.is_empty() {
        let _ = writeln!(out, "\n**Classes:**");
        for class in &file.classes {
            render_class(out, class);
        }
    }

    if !file.functions.is_empty() {
        let _ = writeln!(out, "\n**Functions:**");
        for function in &file.functions {
            render_function(out, function, "");
        }
    }

    if file.has_errors() {
        let _ = writeln!(out, "\n**Errors:**");
        for error in &file.errors {
            let _ = writeln!(out, "- {error}");
        }
    }
}

fn render_class(out: &mut String, class: &Class) {
    let _ = write!(out, "- `{}`", class.name);
    if !class.bases.is_empty() {
        let _ = write!(out, " ({})", class.bases.join(", "));
    }
    let _ = writeln!(out, " [L{}-{}]", class.start_line, class.end_line);
    if !class.doc.is_empty() {
        let _ = writeln!(out, "  > {}", first_line(&class.doc));
    }
    for method in &class.methods {
        render_function(out, method, "  ");
    }
}

fn render_function(out: &mut String, function: &Function, indent: &str) {
    let _ = writeln!(
        out,
        "{indent}- `{}` [L{}-{}]",
        function.signature(),
        function.start_line,
        function.end_line
    );
    if !function.doc.is_empty() {
        let _ = writeln!(out, "{indent}  > {}", first_line(&function.doc));
    }
    if !function.calls.is_empty() {
        let _ = writeln!(out, "{indent}  calls: {}", function.calls.join(", "));
    }
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_line(doc: &str) -> &str {
    doc.lines().next().unwrap_or_default()
}
