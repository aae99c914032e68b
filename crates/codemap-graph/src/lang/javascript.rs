//! JavaScript and TypeScript patterns.
//!
//! TypeScript extends the JavaScript grammar, so its pattern sets are the
//! JavaScript ones plus TypeScript-only node shapes. Arrow functions bound to
//! a variable are keyed on their `variable_declarator`, which is where the
//! name lives.

use super::QueryCategory;

macro_rules! js_imports {
    () => {
        r#"
(import_statement
  source: (string) @module) @import

(import_specifier
  name: (identifier) @name)

(import_clause
  (identifier) @name)

(namespace_import) @wildcard

; CommonJS: require("x")
((call_expression
  function: (identifier) @_require
  arguments: (arguments
    (string) @module)) @import
  (#eq? @_require "require"))
"#
    };
}

macro_rules! js_classes {
    () => {
        r#"
(class_declaration
  name: (_) @name
  body: (class_body) @body) @class

(class_declaration
  (class_heritage) @bases)
"#
    };
}

macro_rules! js_functions {
    () => {
        r#"
(function_declaration
  name: (identifier) @name
  parameters: (formal_parameters) @params
  body: (statement_block) @body) @function

(generator_function_declaration
  name: (identifier) @name
  parameters: (formal_parameters) @params
  body: (statement_block) @body) @function

(method_definition
  name: (_) @name
  parameters: (formal_parameters) @params
  body: (statement_block) @body) @function

(variable_declarator
  name: (identifier) @name
  value: (arrow_function
    body: (_) @body)) @function

(variable_declarator
  value: (arrow_function
    parameters: (formal_parameters) @params))
"#
    };
}

macro_rules! js_calls {
    () => {
        r#"
(call_expression
  function: (identifier) @callee)

(call_expression
  function: (member_expression
    property: (property_identifier) @callee))

(new_expression
  constructor: (identifier) @callee)
"#
    };
}

const TS_CLASSES: &str = concat!(
    js_classes!(),
    r#"
(abstract_class_declaration
  name: (type_identifier) @name
  body: (class_body) @body) @class

(abstract_class_declaration
  (class_heritage) @bases)

(interface_declaration
  name: (type_identifier) @name) @class
"#
);

const TS_FUNCTIONS: &str = concat!(
    js_functions!(),
    r#"
(function_declaration
  return_type: (type_annotation) @return_type)

(method_definition
  return_type: (type_annotation) @return_type)

(variable_declarator
  value: (arrow_function
    return_type: (type_annotation) @return_type))
"#
);

pub(super) fn javascript_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => js_imports!(),
        QueryCategory::Classes => js_classes!(),
        QueryCategory::Functions => js_functions!(),
        QueryCategory::Calls => js_calls!(),
    }
}

pub(super) fn typescript_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => js_imports!(),
        QueryCategory::Classes => TS_CLASSES,
        QueryCategory::Functions => TS_FUNCTIONS,
        QueryCategory::Calls => js_calls!(),
    }
}
