//! End-to-end tests
//!
//! Each test writes a small polyglot project into a temp directory and runs
//! discovery, extraction and resolution over it.

use std::fs;
use std::path::Path;

use codemap_graph::{
    Analysis, AnalysisOptions, DiscoveryOptions, Granularity, GraphBuilder, discover,
};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, content).expect("write file");
}

fn sample_project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();

    write(
        root,
        "animals/base.py",
        r#"class Animal:
    """Something alive."""

    def speak(self):
        pass
"#,
    );
    write(
        root,
        "animals/dog.py",
        r#"from animals.base import Animal


class Dog(Animal):
    def speak(self):
        self.bark()

    def bark(self):
        pass

    def _wag(self):
        pass
"#,
    );
    write(
        root,
        "web/app.js",
        "import { render } from './view';\n\nfunction main() {\n  render();\n}\n",
    );
    write(root, "web/view.js", "export function render() {}\n");
    write(root, "notes.txt", "not code\n");
    dir
}

fn analyze(root: &Path, options: AnalysisOptions, discovery: &DiscoveryOptions) -> Analysis {
    GraphBuilder::new(options)
        .build_directory(root, discovery)
        .expect("analysis should succeed")
}

/// Full pipeline: dependencies, inheritance and call graph across languages.
#[test]
fn test_e2e_relationships() {
    let project = sample_project();
    let analysis = analyze(
        project.path(),
        AnalysisOptions::default(),
        &DiscoveryOptions::default(),
    );

    let paths: Vec<_> = analysis.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["animals/base.py", "animals/dog.py", "web/app.js", "web/view.js"]
    );

    let rel = &analysis.relationships;
    assert_eq!(
        rel.dependencies_of("animals/dog.py").collect::<Vec<_>>(),
        vec!["animals/base.py"]
    );
    assert_eq!(
        rel.dependencies_of("web/app.js").collect::<Vec<_>>(),
        vec!["web/view.js"]
    );
    assert_eq!(rel.dependencies_of("animals/base.py").count(), 0);

    assert_eq!(rel.inheritance["Dog"], vec!["Animal"]);
    assert!(!rel.inheritance.contains_key("Animal"));

    let internal = rel.internal_calls();
    assert_eq!(internal["Dog.speak"], vec!["bark"]);
    assert_eq!(internal["web/app.js::main"], vec!["render"]);
}

/// A file with an unrecognized extension is counted with exactly one error.
#[test]
fn test_e2e_unsupported_file() {
    let project = sample_project();
    let analysis = analyze(
        project.path(),
        AnalysisOptions::default(),
        &DiscoveryOptions::default().all_files(),
    );

    assert_eq!(analysis.stats.files_processed, 5);
    assert_eq!(analysis.stats.files_with_errors, 1);

    let notes = analysis.file("notes.txt").expect("notes.txt present");
    assert!(notes.is_empty());
    assert_eq!(notes.errors.len(), 1);
    assert!(notes.errors[0].contains("Unsupported"));
}

/// Private members are dropped unless requested.
#[test]
fn test_e2e_privacy() {
    let project = sample_project();
    let discovery = DiscoveryOptions::default();

    let public = analyze(project.path(), AnalysisOptions::default(), &discovery);
    let dog = &public.file("animals/dog.py").expect("dog.py").classes[0];
    let names: Vec<_> = dog.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["speak", "bark"]);

    let all = analyze(
        project.path(),
        AnalysisOptions::default().with_private(true),
        &discovery,
    );
    let dog = &all.file("animals/dog.py").expect("dog.py").classes[0];
    let wag = dog.method("_wag").expect("_wag kept");
    assert!(wag.is_private);
    assert!(wag.is_method);
    assert_eq!(all.stats.methods, public.stats.methods + 1);
}

/// File granularity keeps imports and dependencies but no entities.
#[test]
fn test_e2e_file_granularity() {
    let project = sample_project();
    let analysis = analyze(
        project.path(),
        AnalysisOptions::default().with_granularity(Granularity::File),
        &DiscoveryOptions::default(),
    );

    for file in &analysis.files {
        assert!(file.classes.is_empty(), "{} has classes", file.path);
        assert!(file.functions.is_empty(), "{} has functions", file.path);
    }
    assert_eq!(
        analysis
            .relationships
            .dependencies_of("animals/dog.py")
            .collect::<Vec<_>>(),
        vec!["animals/base.py"]
    );
    assert!(analysis.relationships.inheritance.is_empty());
    assert!(analysis.relationships.calls.is_empty());
}

/// Worker count does not change the result.
#[test]
fn test_e2e_parallelism_is_deterministic() {
    let project = sample_project();
    let discovery = DiscoveryOptions::default();
    let serial = analyze(
        project.path(),
        AnalysisOptions::default().with_parallelism(1),
        &discovery,
    );
    let parallel = analyze(
        project.path(),
        AnalysisOptions::default().with_parallelism(4),
        &discovery,
    );

    assert_eq!(serial.files, parallel.files);
    assert_eq!(serial.relationships, parallel.relationships);
}

/// Discovery output feeds the builder directly.
#[test]
fn test_e2e_discover_then_build() {
    let project = sample_project();
    let files = discover(project.path(), &DiscoveryOptions::default().with_extensions(["py"]))
        .expect("discover");
    assert_eq!(files.len(), 2);

    let analysis = GraphBuilder::default().build(&files);
    assert_eq!(analysis.stats.classes, 2);
    assert_eq!(analysis.relationships.class_index["Dog"], vec!["animals/dog.py"]);
}

/// The serialized analysis carries every section and hides byte offsets.
#[test]
fn test_e2e_json_output() {
    let project = sample_project();
    let analysis = analyze(
        project.path(),
        AnalysisOptions::default(),
        &DiscoveryOptions::default(),
    );

    let json = serde_json::to_string_pretty(&analysis).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

    let base = &value["files"][0];
    assert_eq!(base["path"], "animals/base.py");
    assert_eq!(base["classes"][0]["name"], "Animal");
    assert_eq!(base["classes"][0]["doc"], "Something alive.");
    assert!(base["classes"][0]["methods"][0].get("offset").is_none());
    assert_eq!(
        value["relationships"]["dependencies"]["web/app.js"][0],
        "web/view.js"
    );
    assert_eq!(value["stats"]["files_processed"], 4);
}
