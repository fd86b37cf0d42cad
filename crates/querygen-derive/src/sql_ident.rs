use proc_macro2::Span;
use syn::{Error, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a column name.
pub(crate) fn parse_sql_ident(s: &str, span: Span, what: &str) -> Result<String> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::new(span, format!("{what} must not be empty")));
    }
    if !is_valid_sql_ident(s) {
        return Err(Error::new(
            span,
            format!("{what} must be a valid SQL identifier (expected [A-Za-z_][A-Za-z0-9_]*)"),
        ));
    }
    Ok(s.to_string())
}

/// Validate a table name, optionally schema-qualified (`auth.users`).
pub(crate) fn parse_table_ident(s: &str, span: Span) -> Result<String> {
    let s = s.trim();
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| is_valid_sql_ident(p)) {
        return Err(Error::new(
            span,
            format!("table '{s}' must be `name` or `schema.name` with valid SQL identifiers"),
        ));
    }
    Ok(s.to_string())
}
