//! Left operands: attribute key syntax, JSON paths and expression formatting.

use super::WhereCompiler;
use crate::condition::{PathSegment, SqlExpr};
use crate::error::{QueryError, QueryResult};
use crate::expr::{Composition, Slot};
use crate::ident::{Ident, validate_function_name, validate_type_name};

/// Parse an attribute key into its operand.
///
/// - `name` is a model attribute
/// - `$table.column$` is a qualified column reference
/// - `meta.a.0` navigates the JSON document in `meta` (numeric segments are indexes)
/// - `age::integer` casts the operand, after any JSON path
pub fn parse_attribute(key: &str) -> QueryResult<SqlExpr> {
    let (base, rest) = match key.strip_prefix('$') {
        Some(inner) => {
            let end = inner.find('$').ok_or_else(|| {
                QueryError::invalid_identifier(format!("unterminated '$' in attribute {key:?}"))
            })?;
            (SqlExpr::col(&inner[..end]), &inner[end + 1..])
        }
        None => {
            let end = [key.find('.'), key.find("::")]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(key.len());
            (SqlExpr::attr(&key[..end]), &key[end..])
        }
    };

    if matches!(&base, SqlExpr::Attribute(name) | SqlExpr::Col(name) if name.is_empty()) {
        return Err(QueryError::invalid_identifier(format!(
            "attribute {key:?} has an empty name"
        )));
    }

    let suffix = NestedKey::parse(rest, key)?;
    Ok(suffix.apply_casts(wrap_json_path(&base, &suffix.path)))
}

/// JSON path segments and casts of a nested key such as `a.b::integer`.
#[derive(Debug, Default, PartialEq)]
pub(super) struct NestedKey {
    pub path: Vec<PathSegment>,
    pub casts: Vec<String>,
}

impl NestedKey {
    /// `rest` is either empty or starts with `.` or `::`.
    fn parse(rest: &str, key: &str) -> QueryResult<Self> {
        let (path_part, cast_part) = match rest.find("::") {
            Some(i) => (&rest[..i], Some(&rest[i + 2..])),
            None => (rest, None),
        };

        let mut parsed = NestedKey::default();
        if !path_part.is_empty() {
            let segments = path_part.strip_prefix('.').ok_or_else(|| {
                QueryError::invalid_identifier(format!("malformed path in {key:?}"))
            })?;
            for segment in segments.split('.') {
                if segment.is_empty() {
                    return Err(QueryError::invalid_identifier(format!(
                        "empty path segment in {key:?}"
                    )));
                }
                parsed.path.push(match segment.parse::<u32>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(segment.to_string()),
                });
            }
        }

        if let Some(casts) = cast_part {
            for cast in casts.split("::") {
                if cast.trim().is_empty() {
                    return Err(QueryError::invalid_identifier(format!(
                        "empty cast in {key:?}"
                    )));
                }
                parsed.casts.push(cast.to_string());
            }
        }
        Ok(parsed)
    }

    /// Wrap `operand` in this key's casts, innermost first.
    pub fn apply_casts(&self, operand: SqlExpr) -> SqlExpr {
        self.casts
            .iter()
            .fold(operand, |expr, cast| SqlExpr::cast(expr, cast.as_str()))
    }
}

/// Parse a key found below an attribute (`{ meta: { "a.b::int": 1 } }`).
pub(super) fn parse_nested_key(key: &str) -> QueryResult<NestedKey> {
    if key.is_empty() || key.starts_with("::") {
        return Err(QueryError::invalid_identifier(format!(
            "invalid nested key {key:?}"
        )));
    }
    NestedKey::parse(&format!(".{key}"), key)
}

/// Navigate `path` inside `operand`, merging with an existing path.
pub(super) fn wrap_json_path(operand: &SqlExpr, path: &[PathSegment]) -> SqlExpr {
    if path.is_empty() {
        return operand.clone();
    }
    match operand {
        SqlExpr::JsonPath { expr, path: base } => SqlExpr::JsonPath {
            expr: expr.clone(),
            path: [&base[..], path].concat(),
        },
        other => SqlExpr::JsonPath {
            expr: Box::new(other.clone()),
            path: path.to_vec(),
        },
    }
}

impl WhereCompiler<'_> {
    /// Format a pre-built expression.
    pub fn format_expr(&self, expr: &SqlExpr) -> QueryResult<Composition> {
        match expr {
            SqlExpr::Literal(sql) => Ok(Composition::text(sql.as_str())),
            SqlExpr::Attribute(name) => {
                let column = self
                    .resolver
                    .and_then(|resolver| resolver.find_field(name))
                    .map_or_else(|| name.clone(), |field| field.column.clone());
                let quoted = self.dialect.quote_identifier(&column);
                Ok(Composition::text(match self.prefix {
                    Some(prefix) => format!("{}.{quoted}", self.dialect.quote_identifier(prefix)),
                    None => quoted,
                }))
            }
            SqlExpr::Col(name) if name == "*" => Ok(Composition::text("*")),
            SqlExpr::Col(name) => {
                let ident = Ident::parse(name)?;
                Ok(Composition::text(
                    ident.to_sql(|part| self.dialect.quote_identifier(part)),
                ))
            }
            SqlExpr::Fn { name, args } => {
                validate_function_name(name)?;
                let mut out = Composition::text(format!("{name}("));
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.add(", ");
                    }
                    out.add(self.format_expr(arg)?);
                }
                out.add(")");
                Ok(out)
            }
            SqlExpr::Cast { expr, type_name } => {
                validate_type_name(type_name)?;
                let mut out = Composition::text("CAST(");
                out.add(self.format_expr(expr)?)
                    .add(format!(" AS {})", type_name.trim().to_ascii_uppercase()));
                Ok(out)
            }
            SqlExpr::JsonPath { expr, path } => self.dialect.json_path(self.format_expr(expr)?, path),
            SqlExpr::Value(value) => Ok(Composition::from_segments([Slot::new(value.clone())])),
            SqlExpr::Where { left, condition } => self.format_pojo_where(left, condition),
        }
    }
}
