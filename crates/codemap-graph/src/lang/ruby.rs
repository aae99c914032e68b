//! Ruby patterns.
//!
//! Methods expose no body field, so calls are collected from the whole
//! method node.

use super::QueryCategory;

const IMPORTS: &str = r#"
((call
  method: (identifier) @_method
  arguments: (argument_list
    (string) @module)) @import
  (#match? @_method "^(require|require_relative|load)$"))
"#;

const CLASSES: &str = r#"
(class
  name: (_) @name) @class

(class
  superclass: (superclass (_) @bases))

(module
  name: (_) @name) @class
"#;

const FUNCTIONS: &str = r#"
(method
  name: (_) @name) @function

(method
  parameters: (method_parameters) @params)

(singleton_method
  name: (_) @name) @function

(singleton_method
  parameters: (method_parameters) @params)
"#;

const CALLS: &str = r#"
(call
  method: (identifier) @callee)
"#;

pub(super) fn query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => IMPORTS,
        QueryCategory::Classes => CLASSES,
        QueryCategory::Functions => FUNCTIONS,
        QueryCategory::Calls => CALLS,
    }
}
