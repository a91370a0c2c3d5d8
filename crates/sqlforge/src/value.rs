//! Terminal values carried by value slots.
//!
//! A [`Value`] never reaches SQL text directly: it is always handed to the
//! dialect, which either inlines an escaped literal or registers it as a bound
//! parameter.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A bound of a range (inclusive or exclusive).
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    /// The bound includes the value: `[value` or `value]`
    Inclusive(Value),
    /// The bound excludes the value: `(value` or `value)`
    Exclusive(Value),
}

impl RangeBound {
    /// Returns a reference to the inner value.
    pub fn value(&self) -> &Value {
        match self {
            RangeBound::Inclusive(v) | RangeBound::Exclusive(v) => v,
        }
    }

    /// Returns `true` if this bound is inclusive.
    pub fn is_inclusive(&self) -> bool {
        matches!(self, RangeBound::Inclusive(_))
    }
}

/// A range literal such as `[1,10)`.
///
/// `None` bounds represent unbounded (infinite) endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue {
    pub lower: Option<RangeBound>,
    pub upper: Option<RangeBound>,
    empty: bool,
}

impl RangeValue {
    /// Creates a new range with the given bounds.
    pub fn new(lower: Option<RangeBound>, upper: Option<RangeBound>) -> Self {
        Self {
            lower,
            upper,
            empty: false,
        }
    }

    /// Creates an empty range (contains no values).
    pub fn empty() -> Self {
        Self {
            lower: None,
            upper: None,
            empty: true,
        }
    }

    /// Creates a closed range `[lower, upper]`.
    pub fn inclusive(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self::new(
            Some(RangeBound::Inclusive(lower.into())),
            Some(RangeBound::Inclusive(upper.into())),
        )
    }

    /// Creates a half-open range `[lower, upper)`.
    ///
    /// This is the shape a two-element list takes when it is compared against
    /// a range column.
    pub fn lower_inc(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self::new(
            Some(RangeBound::Inclusive(lower.into())),
            Some(RangeBound::Exclusive(upper.into())),
        )
    }

    /// Builds a half-open range from a `[lower, upper]` pair, where `Null`
    /// means unbounded.
    pub fn from_pair(lower: Value, upper: Value) -> Self {
        let lower = (!lower.is_null()).then(|| RangeBound::Inclusive(lower));
        let upper = (!upper.is_null()).then(|| RangeBound::Exclusive(upper));
        Self::new(lower, upper)
    }

    /// Returns `true` if this is the empty range.
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

/// A terminal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    Array(Vec<Value>),
    Range(Box<RangeValue>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
            Value::Array(_) => "array",
            Value::Range(_) => "range",
        }
    }

    /// Convert into the JSON document this value stands for.
    ///
    /// Used when a value is compared against a JSON column or path.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(J::Null, J::Number),
            Value::Text(s) => J::String(s.clone()),
            Value::Bytes(b) => J::Array(b.iter().map(|x| J::from(*x)).collect()),
            Value::Date(d) => J::String(d.to_string()),
            Value::Timestamp(t) => J::String(t.to_rfc3339()),
            Value::Uuid(u) => J::String(u.to_string()),
            Value::Json(j) => j.clone(),
            Value::Array(items) => J::Array(items.iter().map(Value::to_json).collect()),
            Value::Range(r) => J::Array(vec![
                r.lower.as_ref().map_or(J::Null, |b| b.value().to_json()),
                r.upper.as_ref().map_or(J::Null, |b| b.value().to_json()),
            ]),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{d}"),
            Value::Timestamp(t) => write!(f, "{t}"),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Json(j) => write!(f, "{j}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Range(r) if r.is_empty() => f.write_str("empty"),
            Value::Range(r) => {
                match &r.lower {
                    Some(b) if b.is_inclusive() => write!(f, "[{}", b.value())?,
                    Some(b) => write!(f, "({}", b.value())?,
                    None => f.write_str("(")?,
                }
                f.write_str(",")?;
                match &r.upper {
                    Some(b) if b.is_inclusive() => write!(f, "{}]", b.value()),
                    Some(b) => write!(f, "{})", b.value()),
                    None => f.write_str(")"),
                }
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v.and_utc())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<RangeValue> for Value {
    fn from(v: RangeValue) -> Self {
        Value::Range(Box::new(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_is_null() {
        let v: Value = Option::<i32>::None.into();
        assert!(v.is_null());
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }

    #[test]
    fn range_from_pair_is_half_open() {
        let r = RangeValue::from_pair(Value::Int(1), Value::Int(10));
        assert_eq!(Value::from(r).to_string(), "[1,10)");

        let open = RangeValue::from_pair(Value::Null, Value::Int(5));
        assert!(open.lower.is_none());
        assert_eq!(Value::from(open).to_string(), "(,5)");
    }

    #[test]
    fn to_json_keeps_structure() {
        let v = Value::from(vec!["a", "b"]);
        assert_eq!(v.to_json(), serde_json::json!(["a", "b"]));
        assert_eq!(Value::Text("x".into()).to_json(), serde_json::json!("x"));
    }
}
