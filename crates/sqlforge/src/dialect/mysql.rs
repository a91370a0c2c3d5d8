use super::{Dialect, IgnoreStyle, LockMode};
use crate::error::{QueryError, QueryResult};
use crate::operators::{Op, OperatorMap};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// MySQL / MariaDB: backtick identifiers, backslash string escapes, `?` parameters.
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    operators: OperatorMap,
}

impl MySqlDialect {
    pub fn new() -> Self {
        let operators = OperatorMap::standard()
            .with(Op::Regexp, "REGEXP")
            .with(Op::NotRegexp, "NOT REGEXP")
            .without(&[
                Op::ILike,
                Op::NotILike,
                Op::IRegexp,
                Op::NotIRegexp,
                Op::Overlap,
                Op::Contains,
                Op::Contained,
                Op::Adjacent,
                Op::StrictLeft,
                Op::StrictRight,
                Op::NoExtendRight,
                Op::NoExtendLeft,
                Op::Any,
                Op::All,
                Op::Match,
                Op::AnyKeyExists,
                Op::AllKeysExist,
            ]);
        Self { operators }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn operators(&self) -> &OperatorMap {
        &self.operators
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    /// Backslash escapes, as the MySQL client libraries do.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        for c in value.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\x08' => out.push_str("\\b"),
                '\t' => out.push_str("\\t"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\x1a' => out.push_str("\\Z"),
                '"' => out.push_str("\\\""),
                '\'' => out.push_str("\\'"),
                '\\' => out.push_str("\\\\"),
                c => out.push(c),
            }
        }
        out.push('\'');
    }

    /// A string literal compared with JSON is a JSON string, not a document.
    fn write_json_operand(&self, out: &mut String, value_sql: &str) {
        let _ = write!(out, "CAST({value_sql} AS JSON)");
    }

    fn write_value_timestamp(&self, out: &mut String, value: &DateTime<Utc>) {
        let _ = write!(out, "'{}'", value.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    /// `LIMIT offset, count`; an offset alone uses the largest row count.
    fn write_pagination(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        match (limit, offset) {
            (Some(limit), Some(offset)) if offset > 0 => {
                let _ = write!(out, "LIMIT {offset}, {limit}");
            }
            (Some(limit), _) => {
                let _ = write!(out, "LIMIT {limit}");
            }
            (None, Some(offset)) if offset > 0 => {
                let _ = write!(out, "LIMIT {offset}, 18446744073709551615");
            }
            _ => {}
        }
    }

    fn write_lock(&self, out: &mut String, lock: LockMode) -> QueryResult<()> {
        match lock {
            LockMode::Update => out.push_str("FOR UPDATE"),
            LockMode::Share => out.push_str("LOCK IN SHARE MODE"),
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
        IgnoreStyle::Flag("IGNORE")
    }

    fn write_returning(&self, _out: &mut String, _columns: &[String]) -> QueryResult<()> {
        Err(QueryError::unsupported("RETURNING", self.name()))
    }

    fn write_update_limit(&self, out: &mut String, limit: u64) -> QueryResult<()> {
        let _ = write!(out, "LIMIT {limit}");
        Ok(())
    }
}
