//! Schema validation.

use thiserror::Error;

/// Errors that make a grammar unusable for generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("grammar {grammar}: duplicate variant `{variant}`")]
    DuplicateVariant { grammar: String, variant: String },

    #[error("grammar {grammar}: variant `{variant}` declares field `{field}` twice")]
    DuplicateField {
        grammar: String,
        variant: String,
        field: String,
    },

    #[error("grammar {grammar}: variant `{variant}` has no fields")]
    EmptyVariant { grammar: String, variant: String },

    #[error("grammar {grammar}: variant `{variant}` has malformed field `{field}`: {reason}")]
    InvalidField {
        grammar: String,
        variant: String,
        field: String,
        reason: String,
    },

    #[error("grammar {grammar}: `{name}` is not a usable identifier")]
    InvalidName { grammar: String, name: String },

    #[error("grammar {grammar}: variant `{grammar}` would shadow the base type")]
    VariantShadowsBase { grammar: String },

    #[error("grammar {grammar}: variant `{variant}` collides with `{import}`")]
    VariantShadowsImport {
        grammar: String,
        variant: String,
        import: String,
    },

    #[error("grammar {grammar} is defined more than once")]
    DuplicateGrammar { grammar: String },
}

/// Rust keywords that must be written as raw identifiers.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be escaped with `r#`.
const UNESCAPABLE: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Names the generated code relies on; a variant or base named after one
/// would shadow it.
const RESERVED_TYPES: &[&str] = &["Box", "Vec", "Option", "Some", "None", "From", "Visitor", "T", "V"];

/// Returns true if `name` is a plain ASCII identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true if `name` is an identifier usable as a type name.
pub fn is_type_name(name: &str) -> bool {
    is_identifier(name)
        && !UNESCAPABLE.contains(&name)
        && !KEYWORDS.contains(&name)
        && !RESERVED_TYPES.contains(&name)
}

/// Returns true if `name` (already snake_case) can name a field.
pub fn is_field_name(name: &str) -> bool {
    is_identifier(name) && !UNESCAPABLE.contains(&name)
}

/// Returns true if `path` is a `::`-separated path of identifiers.
pub fn is_type_path(path: &str) -> bool {
    path.split("::").all(|segment| is_identifier(segment))
}

/// Returns the names a `use` path brings into scope.
///
/// Accepts `a::b::C` and `a::b::{C, D}`; anything else is `None`.
pub fn imported_names(path: &str) -> Option<Vec<&str>> {
    let Some(open) = path.find('{') else {
        return is_type_path(path).then(|| path.rsplit("::").take(1).collect());
    };

    let prefix = path[..open].strip_suffix("::")?;
    let group = path[open + 1..].strip_suffix('}')?;
    if !is_type_path(prefix) {
        return None;
    }

    let names: Vec<&str> = group
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    (!names.is_empty() && names.iter().all(|name| is_identifier(name))).then_some(names)
}

/// Escape an identifier if it's a Rust keyword.
pub fn escape_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else if UNESCAPABLE.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Convert a `CamelCase` or `camelCase` name to `snake_case`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (idx, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = idx.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(idx + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
