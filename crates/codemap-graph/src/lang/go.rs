//! Go patterns.
//!
//! Struct and interface type specs are classes. Methods are declared outside
//! their receiver type, so they stay free functions flagged as methods.

use super::QueryCategory;

const IMPORTS: &str = r#"
(import_spec
  path: (_) @module) @import

(import_spec
  name: (dot) @wildcard)
"#;

const CLASSES: &str = r#"
(type_spec
  name: (type_identifier) @name
  type: (struct_type) @body) @class

(type_spec
  name: (type_identifier) @name
  type: (interface_type) @body) @class
"#;

const FUNCTIONS: &str = r#"
(function_declaration
  name: (identifier) @name
  parameters: (parameter_list) @params
  body: (block) @body) @function

(function_declaration
  result: (_) @return_type)

(method_declaration
  name: (field_identifier) @name
  parameters: (parameter_list) @params
  body: (block) @body) @function

(method_declaration
  result: (_) @return_type)
"#;

const CALLS: &str = r#"
(call_expression
  function: (identifier) @callee)

(call_expression
  function: (selector_expression
    field: (field_identifier) @callee))
"#;

pub(super) fn query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => IMPORTS,
        QueryCategory::Classes => CLASSES,
        QueryCategory::Functions => FUNCTIONS,
        QueryCategory::Calls => CALLS,
    }
}
