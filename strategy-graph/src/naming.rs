//! Identifier helpers shared by port-id derivation and code generation

/// Lowercase, underscore-separated slug of a display name
///
/// `"Bollinger Bands (20)"` becomes `"bollinger_bands_20"`. Never empty.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        out.push_str("block");
    }
    out
}

/// Slug that is also a valid Rust identifier fragment
pub fn ident(name: &str) -> String {
    let s = slug(name);
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        format!("b_{}", s)
    } else {
        s
    }
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// Whether `name` can be used verbatim as a Rust identifier
pub fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic());
    first_ok
        && name != "_"
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !KEYWORDS.contains(&name)
}

/// Whether `path` is a `::`-separated module path such as `crate::runtime`
pub fn is_module_path(path: &str) -> bool {
    path.split("::").all(is_ident)
}

/// Instance-scoped input port id
pub fn input_port_id(block_id: &str, port_name: &str) -> String {
    format!("{}:in:{}", block_id, slug(port_name))
}

/// Instance-scoped output port id
pub fn output_port_id(block_id: &str, port_name: &str) -> String {
    format!("{}:out:{}", block_id, slug(port_name))
}
