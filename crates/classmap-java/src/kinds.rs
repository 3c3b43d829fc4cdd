//! Node tags produced by the Java grammar.
//!
//! Tags are the grammar's node kinds. Only the ones the examiner queries are
//! listed here.

pub const PROGRAM: &str = "program";
pub const PACKAGE_DECLARATION: &str = "package_declaration";
pub const IMPORT_DECLARATION: &str = "import_declaration";
pub const IDENTIFIER: &str = "identifier";
pub const SCOPED_IDENTIFIER: &str = "scoped_identifier";
pub const ASTERISK: &str = "asterisk";

// Type declarations
pub const CLASS_DECLARATION: &str = "class_declaration";
pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const ENUM_DECLARATION: &str = "enum_declaration";
pub const CLASS_BODY: &str = "class_body";
pub const INTERFACE_BODY: &str = "interface_body";
pub const ENUM_BODY: &str = "enum_body";
pub const ENUM_BODY_DECLARATIONS: &str = "enum_body_declarations";
pub const SUPERCLASS: &str = "superclass";
pub const SUPER_INTERFACES: &str = "super_interfaces";
pub const EXTENDS_INTERFACES: &str = "extends_interfaces";

// Members
pub const FIELD_DECLARATION: &str = "field_declaration";
pub const CONSTANT_DECLARATION: &str = "constant_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
pub const FORMAL_PARAMETERS: &str = "formal_parameters";
pub const FORMAL_PARAMETER: &str = "formal_parameter";
pub const SPREAD_PARAMETER: &str = "spread_parameter";

// Modifiers and annotations
pub const MODIFIERS: &str = "modifiers";
pub const MARKER_ANNOTATION: &str = "marker_annotation";
pub const ANNOTATION: &str = "annotation";
pub const ANNOTATION_ARGUMENT_LIST: &str = "annotation_argument_list";

// Types
pub const TYPE_IDENTIFIER: &str = "type_identifier";
pub const SCOPED_TYPE_IDENTIFIER: &str = "scoped_type_identifier";
pub const GENERIC_TYPE: &str = "generic_type";
pub const ARRAY_TYPE: &str = "array_type";
pub const VOID_TYPE: &str = "void_type";
pub const INTEGRAL_TYPE: &str = "integral_type";
pub const FLOATING_POINT_TYPE: &str = "floating_point_type";
pub const BOOLEAN_TYPE: &str = "boolean_type";

/// Kinds that appear in a declaration's type position.
pub const TYPE_KINDS: &[&str] = &[
    VOID_TYPE,
    INTEGRAL_TYPE,
    FLOATING_POINT_TYPE,
    BOOLEAN_TYPE,
    TYPE_IDENTIFIER,
    SCOPED_TYPE_IDENTIFIER,
    GENERIC_TYPE,
    ARRAY_TYPE,
];

/// Members whose bodies and signatures contribute type identifiers.
pub const MEMBER_KINDS: &[&str] = &[
    FIELD_DECLARATION,
    CONSTANT_DECLARATION,
    METHOD_DECLARATION,
    CONSTRUCTOR_DECLARATION,
];

pub fn is_type_kind(kind: &str) -> bool {
    TYPE_KINDS.contains(&kind)
}

pub fn is_member_kind(kind: &str) -> bool {
    MEMBER_KINDS.contains(&kind)
}

/// Keyword tokens (`public`, `static`, `non-sealed`) kept in the tree.
pub fn is_keyword_token(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic())
        && text.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_kinds() {
        assert!(is_type_kind("integral_type"));
        assert!(is_type_kind("generic_type"));
        assert!(!is_type_kind("identifier"));
        assert!(!is_type_kind("modifiers"));
    }

    #[test]
    fn keyword_tokens() {
        assert!(is_keyword_token("public"));
        assert!(is_keyword_token("non-sealed"));
        assert!(!is_keyword_token("{"));
        assert!(!is_keyword_token("-"));
        assert!(!is_keyword_token("..."));
        assert!(!is_keyword_token(""));
    }
}
