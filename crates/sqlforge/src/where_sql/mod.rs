//! Declarative conditions to SQL.
//!
//! Compilation walks a [`Condition`] on two levels:
//!
//! - the top level, where lists are an implicit `AND`, map keys are attribute
//!   names or `and` / `or` / `not`, and expressions are emitted as they are;
//! - the attribute level, where a value is compared with the attribute, maps
//!   hold operators and JSON path segments, and lists are an implicit `IN`.
//!
//! Every terminal value becomes a [`Slot`](crate::Slot) typed after the left
//! operand; the renderer decides whether it is inlined or bound.
//!
//! # Example
//!
//! ```ignore
//! use sqlforge::{Condition, Op, PostgresDialect, WhereCompiler, WhereMap};
//!
//! let dialect = PostgresDialect::new();
//! let cond = Condition::map(
//!     WhereMap::new()
//!         .with("active", true)
//!         .with("age", WhereMap::new().with(Op::Gt, 18)),
//! );
//! // "active" = ? AND "age" > ?
//! let sql = WhereCompiler::new(&dialect).format_where_options(&cond)?;
//! ```

mod handlers;
mod join;
mod operand;

pub use operand::parse_attribute;

use crate::condition::{Condition, Key, PathSegment, SqlExpr, WhereMap};
use crate::data_type::{DataType, FieldResolver};
use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::expr::Composition;
use crate::operators::Op;
use crate::value::Value;
use join::{join_with_logical_operator, wrap_with_not};
use operand::{parse_nested_key, wrap_json_path};
use std::borrow::Cow;

/// Compiles conditions for one dialect.
///
/// Cheap to build; holds only borrowed collaborators.
#[derive(Clone, Copy)]
pub struct WhereCompiler<'a> {
    dialect: &'a dyn Dialect,
    resolver: Option<&'a dyn FieldResolver>,
    prefix: Option<&'a str>,
}

impl<'a> WhereCompiler<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            resolver: None,
            prefix: None,
        }
    }

    /// Look up attribute columns and types through `resolver`.
    pub fn with_resolver(mut self, resolver: &'a dyn FieldResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Qualify attribute columns with a table name or alias.
    pub fn with_prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Compile a complete condition. An empty result means "no restriction".
    pub fn format_where_options(&self, condition: &Condition) -> QueryResult<Composition> {
        let sql = self.format_logical(condition, Op::And)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlforge.where",
            dialect = self.dialect.name(),
            items = sql.len(),
            "compiled where clause"
        );

        Ok(sql)
    }

    /// Compile `value` as the condition on the operand `left`.
    pub fn format_pojo_where(&self, left: &SqlExpr, value: &Condition) -> QueryResult<Composition> {
        let allow_json_path = self.operand_type(left).is_none_or(|ty| ty.is_json());
        self.format_nested(left, value, allow_json_path, Op::And, &[])
    }

    // ==================== Top level ====================

    fn format_logical(&self, condition: &Condition, logical: Op) -> QueryResult<Composition> {
        match condition {
            Condition::List(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.format_logical(item, Op::And))
                    .collect::<QueryResult<Vec<_>>>()?;
                join_with_logical_operator(parts, logical)
            }
            Condition::Map(map) => {
                let mut parts = Vec::with_capacity(map.len());
                for (key, value) in map.iter() {
                    let part = match key {
                        Key::Op(Op::Not) => wrap_with_not(self.format_logical(value, Op::And)?),
                        Key::Op(op @ (Op::And | Op::Or)) => self.format_logical(value, *op)?,
                        Key::Op(op) => return Err(disallowed_operator(map, *op)),
                        Key::Attr(name) => self.format_pojo_where(&parse_attribute(name)?, value)?,
                    };
                    parts.push(part);
                }
                join_with_logical_operator(parts, logical)
            }
            Condition::Expr(expr) => self.format_expr(expr),
            Condition::Value(value) => Err(QueryError::usage(format!(
                "{value:?} is not a valid where condition, expected a map, a list or an expression"
            ))),
        }
    }

    // ==================== Attribute level ====================

    fn format_nested(
        &self,
        left: &SqlExpr,
        value: &Condition,
        allow_json_path: bool,
        logical: Op,
        path: &[PathSegment],
    ) -> QueryResult<Composition> {
        let map = match value {
            Condition::Map(map) if allow_json_path || !map.has_attr_keys() => map,
            _ => return self.handle_part(&wrap_json_path(left, path), None, value),
        };

        let mut parts = Vec::with_capacity(map.len());
        for (key, value) in map.iter() {
            let part = match key {
                Key::Attr(name) => {
                    let nested = parse_nested_key(name)?;
                    let full_path = [path, &nested.path[..]].concat();
                    if nested.casts.is_empty() {
                        self.format_nested(left, value, allow_json_path, logical, &full_path)?
                    } else {
                        // leaving the JSON document: the cast operand starts a fresh path
                        let operand = nested.apply_casts(wrap_json_path(left, &full_path));
                        self.format_nested(&operand, value, false, logical, &[])?
                    }
                }
                Key::Op(Op::Not) => {
                    wrap_with_not(self.format_nested(left, value, allow_json_path, Op::And, path)?)
                }
                Key::Op(op @ (Op::And | Op::Or)) => match value {
                    Condition::List(items) => {
                        let parts = items
                            .iter()
                            .map(|item| self.format_nested(left, item, allow_json_path, Op::And, path))
                            .collect::<QueryResult<Vec<_>>>()?;
                        join_with_logical_operator(parts, *op)?
                    }
                    _ => self.format_nested(left, value, allow_json_path, *op, path)?,
                },
                Key::Op(op) => self.handle_part(&wrap_json_path(left, path), Some(*op), value)?,
            };
            parts.push(part);
        }
        join_with_logical_operator(parts, logical)
    }

    /// One terminal comparison: `left <op> right`, inferring the operator when absent.
    fn handle_part(&self, left: &SqlExpr, op: Option<Op>, right: &Condition) -> QueryResult<Composition> {
        let left_type = self.operand_type(left);
        let mut right = Cow::Borrowed(right);
        let mut op = op;

        if op == Some(Op::Col) {
            let Condition::Value(Value::Text(column)) = &*right else {
                return Err(QueryError::usage(format!(
                    "Op.col must be used with a column name, got {right:?}"
                )));
            };
            right = Cow::Owned(Condition::Expr(SqlExpr::col(column.clone())));
            op = Some(Op::Eq);
        }

        // `{ id: { any: [...] } }` compares with `= ANY (...)`
        if let Some(quantifier @ (Op::Any | Op::All)) = op {
            right = Cow::Owned(Condition::Map(
                WhereMap::new().with(quantifier, right.into_owned()),
            ));
            op = Some(Op::Eq);
        }

        let is_json = left_type.as_ref().is_some_and(DataType::is_json);
        let op = match op {
            Some(op) => op,
            None if right.is_null() && is_json => {
                return Err(QueryError::usage(
                    "comparing a JSON operand with null is ambiguous: use Op.is for SQL NULL \
                     or Op.eq with a JSON null document",
                ));
            }
            None if right.is_list() && !left_type.as_ref().is_some_and(DataType::is_array) => Op::In,
            None if right.is_null() => Op::Is,
            None => Op::Eq,
        };

        let op = match op {
            Op::Eq if right.is_null() && !is_json => Op::Is,
            Op::Ne if right.is_null() && !is_json => Op::IsNot,
            op => op,
        };

        let right_type = match &*right {
            Condition::Expr(expr) => self.operand_type(expr),
            _ => None,
        };

        self.dispatch(left, left_type, op, &right, right_type)
    }

    /// Declared type of an operand, when it can be known.
    fn operand_type(&self, operand: &SqlExpr) -> Option<DataType> {
        match operand {
            SqlExpr::Attribute(name) => self
                .resolver
                .and_then(|resolver| resolver.find_field(name))
                .map(|field| field.data_type.clone()),
            SqlExpr::Cast { type_name, .. } => DataType::from_sql_name(type_name),
            SqlExpr::JsonPath { .. } => Some(DataType::Json),
            _ => None,
        }
    }
}

fn disallowed_operator(map: &WhereMap, op: Op) -> QueryError {
    QueryError::usage(format!(
        "{map:?} includes the operator {op} but only attributes, Op.and, Op.or, and Op.not are allowed"
    ))
}

#[cfg(test)]
mod tests;
