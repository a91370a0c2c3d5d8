//! Identifier and name validation.
//!
//! [`Ident`] is a dotted column reference (`table.column`, `"Odd Name".id`, `users.*`)
//! whose parts are quoted by the active dialect when rendered. Function names
//! and cast types are written into SQL verbatim, so they are checked here
//! against a strict character set first.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts allow any characters except NUL and escape `"` as `""`

use crate::error::{QueryError, QueryResult};

/// A part of a dotted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Name(String),
    /// `*`, only allowed as the last part.
    Wildcard,
}

/// A dotted column or table reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse a dotted identifier.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Wildcard: `users.*`
    pub fn parse(s: &str) -> QueryResult<Self> {
        if s.is_empty() {
            return Err(QueryError::invalid_identifier("identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(QueryError::invalid_identifier(
                "identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(QueryError::invalid_identifier(format!(
                                "trailing '.' in {s:?}"
                            )));
                        }
                    }
                    Some(c) => {
                        return Err(QueryError::invalid_identifier(format!(
                            "expected '.' between identifier parts of {s:?}, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if matches!(parts.last(), Some(IdentPart::Wildcard)) {
                return Err(QueryError::invalid_identifier(format!(
                    "'*' must be the last part of {s:?}"
                )));
            }

            if chars.peek() == Some(&'*') {
                chars.next();
                parts.push(IdentPart::Wildcard);
                continue;
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(QueryError::invalid_identifier(format!(
                                "unclosed quoted identifier in {s:?}"
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(QueryError::invalid_identifier("empty quoted identifier"));
                }
                parts.push(IdentPart::Name(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(QueryError::invalid_identifier(format!(
                        "invalid character '{c}' in {s:?}"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(QueryError::invalid_identifier(format!(
                    "empty identifier segment in {s:?}"
                )));
            }
            parts.push(IdentPart::Name(name));
        }

        Ok(Self { parts })
    }

    /// Render the identifier, quoting each named part with `quote`.
    pub fn to_sql(&self, quote: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Name(name) => out.push_str(&quote(name)),
                IdentPart::Wildcard => out.push('*'),
            }
        }
        out
    }
}

/// Check a SQL function name such as `lower` or `pg_catalog.upper`.
pub fn validate_function_name(name: &str) -> QueryResult<()> {
    let mut segments = name.split('.');
    let valid = segments.all(|seg| {
        let mut chars = seg.chars();
        matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
            && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
    });
    if valid {
        Ok(())
    } else {
        Err(QueryError::invalid_identifier(format!(
            "invalid function name {name:?}"
        )))
    }
}

/// Check a cast target such as `integer`, `varchar(20)` or `text[]`.
pub fn validate_type_name(name: &str) -> QueryResult<()> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed.starts_with(|c: char| c.is_ascii_alphabetic())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | '[' | ']' | ','));
    if valid {
        Ok(())
    } else {
        Err(QueryError::invalid_identifier(format!(
            "invalid cast type {name:?}"
        )))
    }
}
