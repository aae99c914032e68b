//! Java and C# patterns.

use super::QueryCategory;

const JAVA_IMPORTS: &str = r#"
(import_declaration
  (scoped_identifier) @module) @import

(import_declaration
  (identifier) @module) @import

(import_declaration
  (asterisk) @wildcard)
"#;

const JAVA_CLASSES: &str = r#"
(class_declaration
  name: (identifier) @name
  body: (class_body) @body) @class

(class_declaration
  superclass: (superclass) @bases)

(class_declaration
  interfaces: (super_interfaces) @bases)

(interface_declaration
  name: (identifier) @name) @class

(interface_declaration
  (extends_interfaces) @bases)

(enum_declaration
  name: (identifier) @name) @class

(record_declaration
  name: (identifier) @name) @class
"#;

const JAVA_FUNCTIONS: &str = r#"
(method_declaration
  name: (identifier) @name
  parameters: (formal_parameters) @params) @function

(method_declaration
  type: (_) @return_type)

(method_declaration
  body: (block) @body)

(constructor_declaration
  name: (identifier) @name
  parameters: (formal_parameters) @params
  body: (constructor_body) @body) @function
"#;

const JAVA_CALLS: &str = r#"
(method_invocation
  name: (identifier) @callee)

(object_creation_expression
  type: (type_identifier) @callee)
"#;

const CSHARP_IMPORTS: &str = r#"
(using_directive
  (qualified_name) @module) @import

(using_directive
  (identifier) @module) @import
"#;

const CSHARP_CLASSES: &str = r#"
(class_declaration
  name: (identifier) @name) @class

(class_declaration
  (base_list) @bases)

(interface_declaration
  name: (identifier) @name) @class

(interface_declaration
  (base_list) @bases)

(struct_declaration
  name: (identifier) @name) @class

(record_declaration
  name: (identifier) @name) @class

(enum_declaration
  name: (identifier) @name) @class
"#;

const CSHARP_FUNCTIONS: &str = r#"
(method_declaration
  name: (identifier) @name
  parameters: (parameter_list) @params) @function

(method_declaration
  body: (block) @body)

(constructor_declaration
  name: (identifier) @name
  parameters: (parameter_list) @params) @function

(constructor_declaration
  body: (block) @body)
"#;

const CSHARP_CALLS: &str = r#"
(invocation_expression
  function: (identifier) @callee)

(invocation_expression
  function: (member_access_expression
    name: (identifier) @callee))

(object_creation_expression
  type: (identifier) @callee)
"#;

pub(super) fn java_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => JAVA_IMPORTS,
        QueryCategory::Classes => JAVA_CLASSES,
        QueryCategory::Functions => JAVA_FUNCTIONS,
        QueryCategory::Calls => JAVA_CALLS,
    }
}

pub(super) fn csharp_query(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Imports => CSHARP_IMPORTS,
        QueryCategory::Classes => CSHARP_CLASSES,
        QueryCategory::Functions => CSHARP_FUNCTIONS,
        QueryCategory::Calls => CSHARP_CALLS,
    }
}
