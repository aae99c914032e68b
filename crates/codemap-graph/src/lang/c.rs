//! C and C++ patterns.
//!
//! A struct only counts as a definition when it has a body; `struct foo *p`
//! references are skipped.

use super::QueryCategory;

macro_rules! c_imports {
    () => {
        r#"
(preproc_include
  path: (_) @module) @import
"#
    };
}

macro_rules! c_functions {
    () => {
        r#"
(function_definition
  declarator: (function_declarator
    declarator: (identifier) @name
    parameters: (parameter_list) @params)
  body: (compound_statement) @body) @function

(function_definition
  declarator: (pointer_declarator
    declarator: (function_declarator
      declarator: (identifier) @name
      parameters: (parameter_list) @params))
  body: (compound_statement) @body) @function

(function_definition
  type: (_) @return_type)
"#
    };
}

macro_rules! c_calls {
    () => {
        r#"
(call_expression
  function: (identifier) @callee)

(call_expression
  function: (field_expression
    field: (field_identifier) @callee))
"#
    };
}

const C_CLASSES: &str = r#"
(struct_specifier
  name: (type_identifier) @name
  body: (field_declaration_list) @body) @class
"#;

const CPP_CLASSES: &str = r#"
(struct_specifier
  name: (type_identifier) @name
  body: (field_declaration_list) @body) @class

(class_specifier
  name: (type_identifier) @name
  body: (field_declaration_list) @body) @class

(class_specifier
  (base_class_clause) @bases)

(struct_specifier
  (base_class_clause) @bases)
"#;

const CPP_FUNCTIONS: &str = concat!(
    c_functions!(),
    r#"
; inline member functions
(function_definition
  declarator: (function_declarator
    declarator: (field_identifier) @name
    parameters: (parameter_list) @params)
  body: (compound_statement) @body) @function

; out-of-line definitions: void Foo::bar()
(function_definition
  declarator: (function_declarator
    declarator: (qualified_identifier
      name: (identifier) @name)
    parameters: (parameter_list) @params)
  body: (compound_statement) @body) @function
"#
);

const CPP_CALLS: &str = concat!(
    c_calls!(),
    r#"
(call_expression
  function: (qualified_identifier
    name: (identifier) @callee))
"#
);

pub(super) fn c_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => c_imports!(),
        QueryCategory::Classes => C_CLASSES,
        QueryCategory::Functions => c_functions!(),
        QueryCategory::Calls => c_calls!(),
    }
}

pub(super) fn cpp_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => c_imports!(),
        QueryCategory::Classes => CPP_CLASSES,
        QueryCategory::Functions => CPP_FUNCTIONS,
        QueryCategory::Calls => CPP_CALLS,
    }
}
