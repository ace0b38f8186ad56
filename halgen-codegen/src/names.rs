use heck::ToSnakeCase;
use proc_macro2::Ident;
use quote::format_ident;

/// `cachegroup_parameter` -> `CachegroupParameter`
///
/// Only the first character of every underscore separated segment is touched,
/// the rest of the segment keeps its case. Empty segments are dropped.
pub fn exported_name(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(upper_first)
        .collect()
}

/// `cachegroup_parameter` -> `cachegroupParameter`
pub fn field_name(identifier: &str) -> String {
    lower_first(&exported_name(identifier))
}

/// Singular form of an English noun, `parameters` -> `parameter`
pub fn singular(name: &str) -> String {
    pluralizer::pluralize(name, 1, false)
}

/// Plural form of an English noun, `server` -> `servers`
pub fn plural(name: &str) -> String {
    pluralizer::pluralize(name, 2, false)
}

/// Name of the link type of a table, also the link field of the first
/// column referencing it
pub fn link_name(foreign_table: &str) -> String {
    format!("{}Link", exported_name(foreign_table))
}

/// Module, and file stem, generated for a table
pub fn module_name(table: &str) -> String {
    table.to_snake_case()
}

/// Rust identifier for a column, struct field or descriptor name
pub fn rust_ident(name: &str) -> Ident {
    format_ident!("{}", escape_rust_keyword(name.to_snake_case()))
}

/// Rust type identifier for a descriptor name that is already exported
pub fn type_ident(name: &str) -> Ident {
    format_ident!("{}", name)
}

pub fn escape_rust_keyword<T>(string: T) -> String
where
    T: ToString,
{
    let string = string.to_string();
    if RUST_KEYWORDS.iter().any(|s| s.eq(&string)) {
        format!("r#{string}")
    } else if RUST_SPECIAL_KEYWORDS.iter().any(|s| s.eq(&string)) {
        format!("{string}_")
    } else {
        string
    }
}

fn upper_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) const RUST_KEYWORDS: [&str; 48] = [
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "union", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

pub(crate) const RUST_SPECIAL_KEYWORDS: [&str; 4] = ["crate", "Self", "self", "super"];
