use super::{Dialect, IgnoreStyle, LockMode};
use crate::error::{QueryError, QueryResult};
use crate::operators::{Op, OperatorMap};
use std::fmt::Write;

/// SQLite: booleans stored as integers, `json_extract` paths, no row locks.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    operators: OperatorMap,
}

impl SqliteDialect {
    pub fn new() -> Self {
        let operators = OperatorMap::standard().without(&[
            Op::ILike,
            Op::NotILike,
            Op::Regexp,
            Op::NotRegexp,
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

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn operators(&self) -> &OperatorMap {
        &self.operators
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["0", "1"][value as usize]);
    }

    /// `LIMIT -1` stands for "no limit" when only an offset is given.
    fn write_pagination(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        match (limit, offset) {
            (Some(limit), Some(offset)) if offset > 0 => {
                let _ = write!(out, "LIMIT {limit} OFFSET {offset}");
            }
            (Some(limit), _) => {
                let _ = write!(out, "LIMIT {limit}");
            }
            (None, Some(offset)) if offset > 0 => {
                let _ = write!(out, "LIMIT -1 OFFSET {offset}");
            }
            _ => {}
        }
    }

    fn write_lock(&self, _out: &mut String, lock: LockMode) -> QueryResult<()> {
        Err(QueryError::unsupported(
            format!("lock mode {lock:?}"),
            self.name(),
        ))
    }

    fn ignore_duplicates(&self) -> IgnoreStyle {
        IgnoreStyle::Flag("OR IGNORE")
    }

    /// `DEFAULT` is not accepted inside `VALUES`.
    fn write_default_value(&self, out: &mut String) {
        out.push_str("NULL");
    }
}
