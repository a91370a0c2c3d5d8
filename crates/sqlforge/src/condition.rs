//! Declarative condition values.
//!
//! A [`Condition`] is the input of the where compiler: a terminal value, a list,
//! a map whose keys are attribute names or operators, or a pre-built SQL
//! expression. It is consumed, never stored.
//!
//! # Example
//!
//! ```ignore
//! use sqlforge::{Condition, Op, WhereMap};
//!
//! // { active: true, age: { gt: 18 } }
//! let cond = Condition::map(
//!     WhereMap::new()
//!         .with("active", true)
//!         .with("age", WhereMap::new().with(Op::Gt, 18)),
//! );
//! ```

use crate::operators::Op;
use crate::value::{RangeValue, Value};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use uuid::Uuid;

/// A map key: an attribute name (or JSON path segment) or an operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Attr(String),
    Op(Op),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Attr(name) => write!(f, "{name:?}"),
            Key::Op(op) => write!(f, "{op}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Attr(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Attr(name)
    }
}

impl From<Op> for Key {
    fn from(op: Op) -> Self {
        Key::Op(op)
    }
}

/// An insertion-ordered map of keys to conditions.
///
/// Compilation follows insertion order, so the generated SQL is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereMap {
    entries: Vec<(Key, Condition)>,
}

impl WhereMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder style). A repeated key replaces the earlier value in place.
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Condition>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Condition>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Condition> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_op(&self, op: Op) -> Option<&Condition> {
        self.get(&Key::Op(op))
    }

    pub fn contains_op(&self, op: Op) -> bool {
        self.get_op(op).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Condition)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` if any key is an attribute name rather than an operator.
    pub fn has_attr_keys(&self) -> bool {
        self.entries.iter().any(|(k, _)| matches!(k, Key::Attr(_)))
    }
}

impl IntoIterator for WhereMap {
    type Item = (Key, Condition);
    type IntoIter = std::vec::IntoIter<(Key, Condition)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(Key, Condition)> for WhereMap {
    fn from_iter<I: IntoIterator<Item = (Key, Condition)>>(iter: I) -> Self {
        let mut map = WhereMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// One step of a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(u32),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<u32> for PathSegment {
    fn from(index: u32) -> Self {
        PathSegment::Index(index)
    }
}

/// A pre-built SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// Trusted SQL text, emitted verbatim.
    Literal(String),
    /// A model attribute, resolved to its column and quoted.
    Attribute(String),
    /// A dotted column reference such as `users.id`, quoted part by part.
    Col(String),
    /// A function call; arguments are expressions or bound values.
    Fn { name: String, args: Vec<SqlExpr> },
    /// `CAST(expr AS type)`
    Cast { expr: Box<SqlExpr>, type_name: String },
    /// Navigation into a JSON document.
    JsonPath {
        expr: Box<SqlExpr>,
        path: Vec<PathSegment>,
    },
    /// A value, escaped or bound like any other.
    Value(Value),
    /// A comparison against `left`, compiled like the value of an attribute key.
    Where {
        left: Box<SqlExpr>,
        condition: Box<Condition>,
    },
}

impl SqlExpr {
    pub fn literal(sql: impl Into<String>) -> Self {
        SqlExpr::Literal(sql.into())
    }

    pub fn attr(name: impl Into<String>) -> Self {
        SqlExpr::Attribute(name.into())
    }

    pub fn col(name: impl Into<String>) -> Self {
        SqlExpr::Col(name.into())
    }

    pub fn func(name: impl Into<String>, args: Vec<SqlExpr>) -> Self {
        SqlExpr::Fn {
            name: name.into(),
            args,
        }
    }

    pub fn cast(expr: SqlExpr, type_name: impl Into<String>) -> Self {
        SqlExpr::Cast {
            expr: Box::new(expr),
            type_name: type_name.into(),
        }
    }

    pub fn json_path<I, S>(expr: SqlExpr, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        SqlExpr::JsonPath {
            expr: Box::new(expr),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    pub fn value(value: impl Into<Value>) -> Self {
        SqlExpr::Value(value.into())
    }

    /// `left <op> right`.
    pub fn where_op(left: SqlExpr, op: Op, right: impl Into<Condition>) -> Self {
        Self::where_with(left, WhereMap::new().with(op, right))
    }

    /// `left` compared against a full attribute-level condition.
    pub fn where_with(left: SqlExpr, condition: impl Into<Condition>) -> Self {
        SqlExpr::Where {
            left: Box::new(left),
            condition: Box::new(condition.into()),
        }
    }
}

/// The declarative condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Value(Value),
    List(Vec<Condition>),
    Map(WhereMap),
    Expr(SqlExpr),
}

impl Condition {
    pub fn map(map: WhereMap) -> Self {
        Condition::Map(map)
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Condition>>) -> Self {
        Condition::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Condition::Value(Value::Null))
    }

    pub fn as_map(&self) -> Option<&WhereMap> {
        match self {
            Condition::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Elements of a list, whether written as a list of conditions or as an
    /// array value.
    pub fn as_list(&self) -> Option<Vec<Condition>> {
        match self {
            Condition::List(items) => Some(items.clone()),
            Condition::Value(Value::Array(items)) => {
                Some(items.iter().cloned().map(Condition::Value).collect())
            }
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Condition::List(_) | Condition::Value(Value::Array(_))
        )
    }

    /// Convert a JSON document: objects become maps with attribute keys,
    /// arrays become lists, everything else a terminal value.
    ///
    /// Operators are spelled through an alias table, see
    /// [`AliasTable::replace_aliases`](crate::AliasTable::replace_aliases).
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Condition::Value(Value::Null),
            J::Bool(b) => Condition::Value(Value::Bool(b)),
            J::Number(n) => Condition::Value(match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            }),
            J::String(s) => Condition::Value(Value::Text(s)),
            J::Array(items) => Condition::List(items.into_iter().map(Condition::from_json).collect()),
            J::Object(obj) => Condition::Map(
                obj.into_iter()
                    .map(|(k, v)| (Key::Attr(k), Condition::from_json(v)))
                    .collect(),
            ),
        }
    }
}

macro_rules! impl_condition_from_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Condition {
                fn from(v: $t) -> Self {
                    Condition::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_condition_from_value!(
    bool, i32, i64, f64, &str, String, NaiveDate, DateTime<Utc>, Uuid, RangeValue
);

impl From<Value> for Condition {
    fn from(v: Value) -> Self {
        Condition::Value(v)
    }
}

impl From<WhereMap> for Condition {
    fn from(map: WhereMap) -> Self {
        Condition::Map(map)
    }
}

impl From<SqlExpr> for Condition {
    fn from(expr: SqlExpr) -> Self {
        Condition::Expr(expr)
    }
}

impl<T: Into<Condition>> From<Vec<T>> for Condition {
    fn from(items: Vec<T>) -> Self {
        Condition::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Condition>> From<Option<T>> for Condition {
    fn from(v: Option<T>) -> Self {
        v.map_or(Condition::Value(Value::Null), Into::into)
    }
}
