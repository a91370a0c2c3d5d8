use super::{Dialect, IgnoreStyle, LockMode};
use crate::condition::PathSegment;
use crate::data_type::DataType;
use crate::error::QueryResult;
use crate::expr::Composition;
use crate::operators::OperatorMap;
use crate::value::{RangeBound, RangeValue, Value};
use std::fmt::Write;

/// PostgreSQL: `$n` parameters, native arrays, ranges and JSON operators.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    operators: OperatorMap,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self {
            operators: OperatorMap::standard(),
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresDialect {
    fn write_range_bound(&self, out: &mut String, value: &Value) {
        match value {
            Value::Text(s) => {
                out.push('"');
                for c in s.chars() {
                    if matches!(c, '"' | '\\') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
            Value::Timestamp(t) => {
                let _ = write!(out, "\"{}\"", t.format("%Y-%m-%d %H:%M:%S%.3f+00"));
            }
            other => {
                let _ = write!(out, "{other}");
            }
        }
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn operators(&self) -> &OperatorMap {
        &self.operators
    }

    fn write_bind_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, "${index}");
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        for b in value {
            let _ = write!(out, "{b:02x}");
        }
        out.push('\'');
    }

    /// `ARRAY[...]`, cast when the element type cannot be inferred from the literals.
    fn write_value_array(
        &self,
        out: &mut String,
        items: &[Value],
        subtype: Option<&DataType>,
    ) -> QueryResult<()> {
        out.push_str("ARRAY[");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.write_value(out, item, subtype)?;
        }
        out.push(']');

        if let Some(subtype) = subtype {
            let needs_cast = items.is_empty()
                || subtype.is_textual()
                || subtype.is_json()
                || matches!(subtype, DataType::Uuid | DataType::Date | DataType::Timestamp);
            if needs_cast {
                let _ = write!(out, "::{}[]", subtype.sql_name());
            }
        }
        Ok(())
    }

    fn write_value_range(&self, out: &mut String, value: &RangeValue) -> QueryResult<()> {
        let mut text = String::new();
        if value.is_empty() {
            text.push_str("empty");
        } else {
            match &value.lower {
                Some(RangeBound::Inclusive(v)) => {
                    text.push('[');
                    self.write_range_bound(&mut text, v);
                }
                Some(RangeBound::Exclusive(v)) => {
                    text.push('(');
                    self.write_range_bound(&mut text, v);
                }
                None => text.push('('),
            }
            text.push(',');
            match &value.upper {
                Some(RangeBound::Inclusive(v)) => {
                    self.write_range_bound(&mut text, v);
                    text.push(']');
                }
                Some(RangeBound::Exclusive(v)) => {
                    self.write_range_bound(&mut text, v);
                    text.push(')');
                }
                None => text.push(')'),
            }
        }
        self.write_value_string(out, &text);
        Ok(())
    }

    /// `expr->'key'` for a single step, `expr#>ARRAY[...]` for longer paths.
    fn json_path(&self, expr: Composition, path: &[PathSegment]) -> QueryResult<Composition> {
        let mut out = expr;
        match path {
            [] => {}
            [PathSegment::Index(i)] => {
                out.add(format!("->{i}"));
            }
            [PathSegment::Key(key)] => {
                out.add(format!("->{}", self.escape_string(key)));
            }
            segments => {
                let mut sql = String::from("#>ARRAY[");
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        sql.push(',');
                    }
                    match segment {
                        PathSegment::Key(key) => self.write_value_string(&mut sql, key),
                        PathSegment::Index(idx) => self.write_value_string(&mut sql, &idx.to_string()),
                    }
                }
                sql.push_str("]::VARCHAR(255)[]");
                out.add(sql);
            }
        }
        Ok(out)
    }

    fn supports_arrays(&self) -> bool {
        true
    }

    fn write_lock(&self, out: &mut String, lock: LockMode) -> QueryResult<()> {
        out.push_str(match lock {
            LockMode::Update => "FOR UPDATE",
            LockMode::Share => "FOR SHARE",
            LockMode::KeyShare => "FOR KEY SHARE",
            LockMode::NoKeyUpdate => "FOR NO KEY UPDATE",
        });
        Ok(())
    }

    fn ignore_duplicates(&self) -> IgnoreStyle {
        IgnoreStyle::OnConflict("ON CONFLICT DO NOTHING")
    }
}
