//! Rust patterns.
//!
//! Structs, enums, traits and impl blocks all count as classes. An
//! `impl Trait for Type` block is a class named after the type whose base is
//! the trait, so methods land in the impl that defines them.

use super::QueryCategory;

const IMPORTS: &str = r#"
; use a::b::C;
(use_declaration
  argument: (scoped_identifier
    path: (_) @module
    name: (identifier) @name)) @import

; use foo;
(use_declaration
  argument: (identifier) @module) @import

; use a::b::C as D;
(use_declaration
  argument: (use_as_clause
    path: (scoped_identifier
      path: (_) @module
      name: (identifier) @name))) @import

; use a::b::{C, D};
(use_declaration
  argument: (scoped_use_list
    path: (_) @module)) @import

(use_declaration
  argument: (scoped_use_list
    list: (use_list
      (identifier) @name)))

; use a::b::*;
(use_declaration
  argument: (use_wildcard
    (_) @module)) @import

(use_declaration
  argument: (use_wildcard) @wildcard)

; mod foo;
(mod_item
  name: (identifier) @module
  !body) @import

; extern crate foo;
(extern_crate_declaration
  name: (identifier) @module) @import
"#;

const CLASSES: &str = r#"
(struct_item
  name: (type_identifier) @name) @class

(enum_item
  name: (type_identifier) @name) @class

(trait_item
  name: (type_identifier) @name) @class

(trait_item
  bounds: (trait_bounds) @bases)

(impl_item
  type: (_) @name) @class

(impl_item
  trait: (_) @bases)
"#;

const FUNCTIONS: &str = r#"
(function_item
  name: (identifier) @name
  parameters: (parameters) @params
  body: (block) @body) @function

(function_item
  return_type: (_) @return_type)

(function_signature_item
  name: (identifier) @name
  parameters: (parameters) @params) @function

(function_signature_item
  return_type: (_) @return_type)
"#;

const CALLS: &str = r#"
(call_expression
  function: (identifier) @callee)

(call_expression
  function: (field_expression
    field: (field_identifier) @callee))

(call_expression
  function: (scoped_identifier
    name: (identifier) @callee))

(macro_invocation
  macro: (identifier) @callee)
"#;

pub(super) fn query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => IMPORTS,
        QueryCategory::Classes => CLASSES,
        QueryCategory::Functions => FUNCTIONS,
        QueryCategory::Calls => CALLS,
    }
}
