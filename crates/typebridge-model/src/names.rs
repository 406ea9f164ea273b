//! Conversions between native identifiers and wire names.

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "do", "dyn", "else", "enum", "extern",
    "false", "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut",
    "override", "priv", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be used as raw identifiers either.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Wire name of a function, field or argument: `with_exec` becomes `withExec`.
pub fn api_name(native: &str) -> String {
    native.trim_start_matches("r#").to_lower_camel_case()
}

/// Wire name of an object, interface, enum or scalar.
pub fn type_name(native: &str) -> String {
    native.to_pascal_case()
}

/// Wire name of an enum member: `NotFound` becomes `NOT_FOUND`.
pub fn enum_value_name(native: &str) -> String {
    native.to_shouty_snake_case()
}

/// Native name of an enum member read from a remote schema.
pub fn enum_variant_name(api: &str) -> String {
    api.to_pascal_case()
}

pub fn is_rust_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// A snake case Rust identifier, escaped when it collides with a keyword.
pub fn rust_field_name(api: &str) -> String {
    escape_keyword(api.to_snake_case())
}

/// A Pascal case Rust type identifier, escaped when it collides with a keyword.
pub fn rust_type_name(api: &str) -> String {
    escape_keyword(api.to_pascal_case())
}

fn escape_keyword(ident: String) -> String {
    if NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if is_rust_keyword(&ident) {
        format!("r#{ident}")
    } else {
        ident
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("with_exec", "withExec")]
    #[case("r#type", "type")]
    #[case("id", "id")]
    #[case("from_ref_name", "fromRefName")]
    fn api_names(#[case] native: &str, #[case] expected: &str) {
        assert_eq!(api_name(native), expected);
    }

    #[rstest]
    #[case("withExec", "with_exec")]
    #[case("type", "r#type")]
    #[case("self", "self_")]
    #[case("ref", "r#ref")]
    fn rust_field_names(#[case] api: &str, #[case] expected: &str) {
        assert_eq!(rust_field_name(api), expected);
    }

    #[test]
    fn enum_values_round_trip_through_pascal_case() {
        assert_eq!(enum_value_name("NotFound"), "NOT_FOUND");
        assert_eq!(enum_variant_name("NOT_FOUND"), "NotFound");
    }
}
