//! Per-engine SQL rendering capabilities.
//!
//! The where compiler and the statement builders never format a value
//! themselves: identifiers, literals, placeholders, JSON navigation and the
//! engine-specific clauses all come from a [`Dialect`].
//!
//! Every method has a default implementation following standard SQL; the
//! engine implementations override what differs.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::condition::PathSegment;
use crate::data_type::DataType;
use crate::error::{QueryError, QueryResult};
use crate::expr::Composition;
use crate::operators::OperatorMap;
use crate::value::{RangeValue, Value};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Row lock requested by a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    Update,
    Share,
    KeyShare,
    NoKeyUpdate,
}

/// How an engine skips rows that would violate a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreStyle {
    /// A flag after `INSERT` (`IGNORE`, `OR IGNORE`).
    Flag(&'static str),
    /// A trailing conflict clause (`ON CONFLICT DO NOTHING`).
    OnConflict(&'static str),
}

/// Supported engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    #[default]
    Postgres,
    #[serde(alias = "mariadb")]
    Mysql,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DialectKind {
    /// Instantiate the dialect.
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::Postgres => Arc::new(PostgresDialect::new()),
            DialectKind::Mysql => Arc::new(MySqlDialect::new()),
            DialectKind::Sqlite => Arc::new(SqliteDialect::new()),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DialectKind::Postgres => "postgres",
            DialectKind::Mysql => "mysql",
            DialectKind::Sqlite => "sqlite",
        })
    }
}

/// Turn `value` into the shape `ty` expects.
///
/// Values compared against JSON are serialized as JSON documents; a
/// two-element list compared against a range becomes a half-open range.
pub fn coerce_value<'a>(value: &'a Value, ty: Option<&DataType>) -> Cow<'a, Value> {
    match (ty, value) {
        (_, Value::Null) => Cow::Borrowed(value),
        (Some(ty), Value::Json(_)) if ty.is_json() => Cow::Borrowed(value),
        (Some(ty), _) if ty.is_json() => Cow::Owned(Value::Json(value.to_json())),
        (Some(DataType::Range(_)), Value::Array(items)) if items.len() == 2 => Cow::Owned(
            RangeValue::from_pair(items[0].clone(), items[1].clone()).into(),
        ),
        _ => Cow::Borrowed(value),
    }
}

/// Escaping, quoting and clause syntax of one database engine.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Short engine name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Rendered keyword per operator. Operators without a keyword are unsupported.
    fn operators(&self) -> &OperatorMap;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', "\"\"");
        out.push('"');
    }

    /// Positional parameter marker for the `index`-th bound value (1-based).
    fn write_bind_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    // ==================== Values ====================

    /// Render `value` as an inline literal of type `ty`.
    fn write_value(&self, out: &mut String, value: &Value, ty: Option<&DataType>) -> QueryResult<()> {
        let value = coerce_value(value, ty);
        match &*value {
            Value::Null => self.write_value_null(out),
            Value::Bool(b) => self.write_value_bool(out, *b),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::Float(f) => self.write_value_float(out, *f),
            Value::Text(s) => self.write_value_string(out, s),
            Value::Bytes(b) => self.write_value_blob(out, b),
            Value::Date(d) => self.write_value_date(out, d),
            Value::Timestamp(t) => self.write_value_timestamp(out, t),
            Value::Uuid(u) => self.write_value_string(out, &u.to_string()),
            Value::Json(j) => self.write_value_json(out, j),
            Value::Array(items) => {
                self.write_value_array(out, items, ty.and_then(DataType::subtype))?
            }
            Value::Range(r) => self.write_value_range(out, r)?,
        }
        Ok(())
    }

    /// Render NULL literal.
    fn write_value_null(&self, out: &mut String) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_float(&self, out: &mut String, value: f64) {
        if value.is_finite() {
            let _ = write!(out, "{value:?}");
        } else if value.is_nan() {
            out.push_str("'NaN'");
        } else if value > 0.0 {
            out.push_str("'Infinity'");
        } else {
            out.push_str("'-Infinity'");
        }
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal using hex escapes.
    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{b:02x}");
        }
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &NaiveDate) {
        let _ = write!(out, "'{}'", value.format("%Y-%m-%d"));
    }

    fn write_value_timestamp(&self, out: &mut String, value: &DateTime<Utc>) {
        let _ = write!(out, "'{}'", value.format("%Y-%m-%d %H:%M:%S%.3f +00:00"));
    }

    /// Render a JSON document as a string literal.
    fn write_value_json(&self, out: &mut String, value: &serde_json::Value) {
        self.write_value_string(out, &value.to_string());
    }

    /// Write a value compared against a JSON operand. `value_sql` is the
    /// escaped literal or the bind placeholder.
    fn write_json_operand(&self, out: &mut String, value_sql: &str) {
        out.push_str(value_sql);
    }

    fn write_value_array(
        &self,
        _out: &mut String,
        _items: &[Value],
        _subtype: Option<&DataType>,
    ) -> QueryResult<()> {
        Err(QueryError::unsupported("array values", self.name()))
    }

    fn write_value_range(&self, _out: &mut String, _value: &RangeValue) -> QueryResult<()> {
        Err(QueryError::unsupported("range values", self.name()))
    }

    // ==================== Expressions ====================

    /// Navigate into a JSON document: `json_extract(expr,'$.a.b')`.
    fn json_path(&self, expr: Composition, path: &[PathSegment]) -> QueryResult<Composition> {
        let mut json_path = String::from("$");
        for segment in path {
            match segment {
                PathSegment::Index(i) => {
                    let _ = write!(json_path, "[{i}]");
                }
                PathSegment::Key(key)
                    if !key.is_empty()
                        && key.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) =>
                {
                    json_path.push('.');
                    json_path.push_str(key);
                }
                PathSegment::Key(key) => {
                    json_path.push_str(".\"");
                    self.write_escaped(&mut json_path, key, '"', "\\\"");
                    json_path.push('"');
                }
            }
        }

        let mut out = Composition::text("json_extract(");
        out.add(expr).add(format!(",{})", self.escape_string(&json_path)));
        Ok(out)
    }

    /// Whether array values (and ANY/ALL over them) can be expressed.
    fn supports_arrays(&self) -> bool {
        false
    }

    // ==================== Clauses ====================

    fn write_pagination(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        match (limit, offset) {
            (Some(limit), Some(offset)) if offset > 0 => {
                let _ = write!(out, "LIMIT {limit} OFFSET {offset}");
            }
            (Some(limit), _) => {
                let _ = write!(out, "LIMIT {limit}");
            }
            (None, Some(offset)) if offset > 0 => {
                let _ = write!(out, "OFFSET {offset}");
            }
            _ => {}
        }
    }

    fn write_lock(&self, out: &mut String, lock: LockMode) -> QueryResult<()> {
        match lock {
            LockMode::Update => out.push_str("FOR UPDATE"),
            LockMode::Share => out.push_str("FOR SHARE"),
            other => {
                return Err(QueryError::unsupported(
                    format!("lock mode {other:?}"),
                    self.name(),
                ));
            }
        }
        Ok(())
    }

    fn ignore_duplicates(&self) -> IgnoreStyle {
        IgnoreStyle::OnConflict("ON CONFLICT DO NOTHING")
    }

    /// `RETURNING <columns>` (already quoted).
    fn write_returning(&self, out: &mut String, columns: &[String]) -> QueryResult<()> {
        out.push_str("RETURNING ");
        if columns.is_empty() {
            out.push('*');
        } else {
            out.push_str(&columns.join(", "));
        }
        Ok(())
    }

    /// Stand-in for a column a row of a multi-row INSERT leaves out.
    fn write_default_value(&self, out: &mut String) {
        out.push_str("DEFAULT");
    }

    fn write_update_limit(&self, _out: &mut String, _limit: u64) -> QueryResult<()> {
        Err(QueryError::unsupported("UPDATE ... LIMIT", self.name()))
    }

    // ==================== Convenience ====================

    fn quote_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_identifier_quoted(&mut out, name);
        out
    }

    fn escape_string(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        self.write_value_string(&mut out, value);
        out
    }

    /// Inline literal of `value` escaped as `ty`.
    fn escape(&self, value: &Value, ty: Option<&DataType>) -> QueryResult<String> {
        let mut out = String::new();
        self.write_value(&mut out, value, ty)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
