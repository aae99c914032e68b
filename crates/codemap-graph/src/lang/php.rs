//! PHP patterns.

use super::QueryCategory;

const IMPORTS: &str = r#"
(namespace_use_clause) @module @import

(require_expression
  (_) @module) @import

(require_once_expression
  (_) @module) @import

(include_expression
  (_) @module) @import

(include_once_expression
  (_) @module) @import
"#;

const CLASSES: &str = r#"
(class_declaration
  name: (name) @name) @class

(class_declaration
  (base_clause) @bases)

(class_declaration
  (class_interface_clause) @bases)

(interface_declaration
  name: (name) @name) @class

(trait_declaration
  name: (name) @name) @class
"#;

const FUNCTIONS: &str = r#"
(function_definition
  name: (name) @name
  parameters: (formal_parameters) @params
  body: (compound_statement) @body) @function

(method_declaration
  name: (name) @name
  parameters: (formal_parameters) @params) @function

(method_declaration
  body: (compound_statement) @body)
"#;

const CALLS: &str = r#"
(function_call_expression
  function: (name) @callee)

(function_call_expression
  function: (qualified_name) @callee)

(member_call_expression
  name: (name) @callee)

(scoped_call_expression
  name: (name) @callee)
"#;

pub(super) fn query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => IMPORTS,
        QueryCategory::Classes => CLASSES,
        QueryCategory::Functions => FUNCTIONS,
        QueryCategory::Calls => CALLS,
    }
}
