//! Python patterns.

use super::QueryCategory;

const IMPORTS: &str = r#"
; import x, import x as y
(import_statement
  name: (dotted_name) @module) @import

(import_statement
  name: (aliased_import
    name: (dotted_name) @module)) @import

; from x import y, from . import y
(import_from_statement
  module_name: (_) @module) @import

(import_from_statement
  name: (dotted_name) @name)

(import_from_statement
  name: (aliased_import
    name: (dotted_name) @name))

(import_from_statement
  (wildcard_import) @wildcard)
"#;

const CLASSES: &str = r#"
(class_definition
  name: (identifier) @name
  body: (block) @body) @class

(class_definition
  superclasses: (argument_list) @bases)
"#;

const FUNCTIONS: &str = r#"
(function_definition
  name: (identifier) @name
  parameters: (parameters) @params
  body: (block) @body) @function

(function_definition
  return_type: (type) @return_type)
"#;

const CALLS: &str = r#"
(call
  function: (identifier) @callee)

(call
  function: (attribute
    attribute: (identifier) @callee))
"#;

pub(super) fn query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => IMPORTS,
        QueryCategory::Classes => CLASSES,
        QueryCategory::Functions => FUNCTIONS,
        QueryCategory::Calls => CALLS,
    }
}
