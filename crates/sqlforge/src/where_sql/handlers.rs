//! Per-operator formatting of terminal comparisons.

use super::WhereCompiler;
use super::join::wrap_ambiguous;
use crate::condition::{Condition, SqlExpr};
use crate::data_type::DataType;
use crate::error::{QueryError, QueryResult};
use crate::expr::{Composition, Slot, SlotOptions};
use crate::operators::Op;
use crate::value::Value;

impl WhereCompiler<'_> {
    pub(super) fn dispatch(
        &self,
        left: &SqlExpr,
        left_type: Option<DataType>,
        op: Op,
        right: &Condition,
        right_type: Option<DataType>,
    ) -> QueryResult<Composition> {
        let left_type = left_type.as_ref();
        let right_type = right_type.as_ref();
        match op {
            Op::In | Op::NotIn => self.format_in(left, left_type, op, right, right_type),
            Op::Is | Op::IsNot => self.format_is(left, op, right),
            Op::Between | Op::NotBetween => self.format_between(left, left_type, op, right, right_type),
            Op::Contains => self.format_contains(left, left_type, right, right_type),
            Op::Contained => self.format_contained(left, left_type, right, right_type),
            Op::StartsWith => self.format_substring(left, left_type, Op::Like, right, false, true),
            Op::NotStartsWith => self.format_substring(left, left_type, Op::NotLike, right, false, true),
            Op::EndsWith => self.format_substring(left, left_type, Op::Like, right, true, false),
            Op::NotEndsWith => self.format_substring(left, left_type, Op::NotLike, right, true, false),
            Op::Substring => self.format_substring(left, left_type, Op::Like, right, true, true),
            Op::NotSubstring => self.format_substring(left, left_type, Op::NotLike, right, true, true),
            Op::Like | Op::NotLike | Op::ILike | Op::NotILike => self.format_binary(
                left,
                left_type,
                op,
                right,
                right_type,
                SlotOptions::accept_strings(),
            ),
            Op::AnyKeyExists | Op::AllKeysExist => self.format_key_exists(left, left_type, op, right),
            _ => self.format_binary(left, left_type, op, right, right_type, SlotOptions::default()),
        }
    }

    // ==================== Operators with dedicated shapes ====================

    fn format_in(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        op: Op,
        right: &Condition,
        right_type: Option<&DataType>,
    ) -> QueryResult<Composition> {
        let ty = right_type.or(left_type);
        let right_sql = match right {
            Condition::Expr(expr @ SqlExpr::Literal(_)) => self.format_expr(expr)?,
            _ => match right.as_list() {
                // `IN ()` is invalid SQL: NOT IN of nothing restricts nothing,
                // IN of nothing matches nothing
                Some(items) if items.is_empty() => {
                    if op == Op::NotIn {
                        return Ok(Composition::new());
                    }
                    Composition::text("(NULL)")
                }
                Some(items) => {
                    let mut list = Composition::text("(");
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            list.add(", ");
                        }
                        list.add(self.escape(item, ty, SlotOptions::default())?);
                    }
                    list.add(")");
                    list
                }
                None => {
                    return Err(QueryError::usage(format!(
                        "Operators {} and {} must be used with a list of values, or a literal, got {right:?}",
                        Op::In,
                        Op::NotIn
                    )));
                }
            },
        };
        self.binary(left, op, right_sql)
    }

    fn format_is(&self, left: &SqlExpr, op: Op, right: &Condition) -> QueryResult<Composition> {
        match right {
            Condition::Value(Value::Null | Value::Bool(_)) | Condition::Expr(SqlExpr::Literal(_)) => {}
            _ => {
                return Err(QueryError::usage(format!(
                    "Operators {} and {} can only be used with null, true, false or a literal, got {right:?}",
                    Op::Is,
                    Op::IsNot
                )));
            }
        }
        // IS does not take bound parameters
        self.format_binary(left, None, op, right, None, SlotOptions::inline())
    }

    fn format_between(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        op: Op,
        right: &Condition,
        right_type: Option<&DataType>,
    ) -> QueryResult<Composition> {
        let ty = right_type.or(left_type);
        let right_sql = match (right, right.as_list()) {
            (Condition::Expr(expr), _) => self.format_expr(expr)?,
            (_, Some(bounds)) if bounds.len() == 2 => {
                let mut sql = self.escape(&bounds[0], ty, SlotOptions::default())?;
                sql.add(" AND ")
                    .add(self.escape(&bounds[1], ty, SlotOptions::default())?);
                sql
            }
            _ => {
                return Err(QueryError::usage(format!(
                    "Operators {} and {} must be used with a list of two values, or an expression, got {right:?}",
                    Op::Between,
                    Op::NotBetween
                )));
            }
        };
        self.binary(left, op, right_sql)
    }

    /// `range @> range`, `range @> element` and `array @> array`.
    fn format_contains(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        right: &Condition,
        right_type: Option<&DataType>,
    ) -> QueryResult<Composition> {
        if let (None, Some(DataType::Range(element))) = (right_type, left_type) {
            let is_range_operand =
                right.is_list() || matches!(right, Condition::Value(Value::Range(_)));
            if !is_range_operand {
                return self.format_binary(
                    left,
                    left_type,
                    Op::Contains,
                    right,
                    Some(element.as_ref()),
                    SlotOptions::default(),
                );
            }
        }
        self.format_binary(left, left_type, Op::Contains, right, right_type, SlotOptions::default())
    }

    /// `range <@ range`, `element <@ range` and `array <@ array`.
    fn format_contained(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        right: &Condition,
        right_type: Option<&DataType>,
    ) -> QueryResult<Composition> {
        if let Some(element) = left_type.filter(|ty| !ty.is_range() && !ty.is_array())
            && right.is_list()
        {
            let range = DataType::range(element.clone());
            return self.format_binary(
                left,
                left_type,
                Op::Contained,
                right,
                Some(&range),
                SlotOptions::default(),
            );
        }
        self.format_binary(left, left_type, Op::Contained, right, right_type, SlotOptions::default())
    }

    /// Anchored LIKE. Static strings get the `%` markers appended directly,
    /// anything else is wrapped in `CONCAT`.
    fn format_substring(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        like: Op,
        right: &Condition,
        start: bool,
        end: bool,
    ) -> QueryResult<Composition> {
        if let Condition::Value(Value::Text(text)) = right {
            let pattern = format!(
                "{}{text}{}",
                if start { "%" } else { "" },
                if end { "%" } else { "" }
            );
            return self.format_binary(
                left,
                left_type,
                like,
                &Condition::Value(Value::Text(pattern)),
                None,
                SlotOptions::accept_strings(),
            );
        }

        let percent = self.dialect.escape_string("%");
        let mut concat = Composition::text("CONCAT(");
        if start {
            concat.add(format!("{percent}, "));
        }
        concat.add(self.escape(right, None, SlotOptions::default())?);
        if end {
            concat.add(format!(", {percent}"));
        }
        concat.add(")");
        self.binary(left, like, concat)
    }

    fn format_key_exists(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        op: Op,
        right: &Condition,
    ) -> QueryResult<Composition> {
        if !self.dialect.supports_arrays() {
            return Err(self.unsupported_operator(op));
        }
        let keys = DataType::array(DataType::Text);
        self.format_binary(left, left_type, op, right, Some(&keys), SlotOptions::default())
    }

    // ==================== Generic binary operation ====================

    /// `left <keyword> right`, where `right` may carry an `any` / `all` quantifier.
    pub(super) fn format_binary(
        &self,
        left: &SqlExpr,
        left_type: Option<&DataType>,
        op: Op,
        right: &Condition,
        right_type: Option<&DataType>,
        options: SlotOptions,
    ) -> QueryResult<Composition> {
        let ty = right_type.or(left_type);
        let right_sql = match self.format_any_all(right, ty, options)? {
            Some(quantified) => quantified,
            None => {
                let sql = self.escape(right, ty, options)?;
                match right {
                    Condition::Expr(expr) => wrap_ambiguous(expr, sql),
                    _ => sql,
                }
            }
        };
        self.binary(left, op, right_sql)
    }

    fn binary(&self, left: &SqlExpr, op: Op, right_sql: Composition) -> QueryResult<Composition> {
        let keyword = self.keyword(op)?;
        let mut out = wrap_ambiguous(left, self.format_expr(left)?);
        out.add(format!(" {keyword} ")).add(right_sql);
        Ok(out)
    }

    /// `ANY (...)` / `ALL (...)` when `right` is `{ any: .. }` or `{ all: .. }`.
    fn format_any_all(
        &self,
        right: &Condition,
        ty: Option<&DataType>,
        options: SlotOptions,
    ) -> QueryResult<Option<Composition>> {
        let Condition::Map(map) = right else {
            return Ok(None);
        };
        let Some((quantifier, operand)) = [Op::Any, Op::All]
            .into_iter()
            .find_map(|op| map.get_op(op).map(|operand| (op, operand)))
        else {
            return Ok(None);
        };
        if map.len() != 1 {
            return Err(QueryError::usage(format!(
                "{map:?} must contain exactly one of {} or {}",
                Op::Any,
                Op::All
            )));
        }

        let keyword = self.keyword(quantifier)?;
        let mut out = Composition::text(format!("{keyword} ("));

        match operand.as_map().and_then(|inner| inner.get_op(Op::Values)) {
            Some(rows) => {
                let rows = rows.as_list().unwrap_or_else(|| vec![rows.clone()]);
                out.add("VALUES ");
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        out.add(", ");
                    }
                    out.add("(").add(self.escape(row, ty, options)?).add(")");
                }
            }
            None => {
                let array_type = ty.cloned().map(DataType::array);
                out.add(self.escape(operand, array_type.as_ref(), options)?);
            }
        }

        out.add(")");
        Ok(Some(out))
    }

    // ==================== Escaping ====================

    /// Turn a right-hand operand into SQL: values become slots typed `ty`,
    /// expressions are formatted, lists of values become one array value.
    pub(super) fn escape(
        &self,
        operand: &Condition,
        ty: Option<&DataType>,
        options: SlotOptions,
    ) -> QueryResult<Composition> {
        let value = match operand {
            Condition::Expr(expr) => return self.format_expr(expr),
            Condition::Value(value) => value.clone(),
            Condition::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Condition::Value(value) => Ok(value.clone()),
                        other => Err(QueryError::usage(format!(
                            "{other:?} cannot be used as an element of a list value"
                        ))),
                    })
                    .collect::<QueryResult<Vec<_>>>()?,
            ),
            Condition::Map(map) => {
                return Err(QueryError::usage(format!(
                    "{map:?} cannot be used as a value"
                )));
            }
        };
        let slot = Slot::new(value)
            .with_type(ty.cloned())
            .with_options(options);
        Ok(Composition::from_segments([slot]))
    }

    fn keyword(&self, op: Op) -> QueryResult<&'static str> {
        self.dialect
            .operators()
            .get(op)
            .ok_or_else(|| self.unsupported_operator(op))
    }

    fn unsupported_operator(&self, op: Op) -> QueryError {
        QueryError::UnsupportedOperator {
            operator: op.name(),
            dialect: self.dialect.name(),
        }
    }
}
