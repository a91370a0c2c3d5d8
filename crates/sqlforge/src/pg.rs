//! `tokio_postgres` parameter encoding for [`Value`].
//!
//! Values are dynamically typed, so each variant checks the parameter type the
//! server asked for and fails with an error instead of writing mismatched
//! bytes. Integers and floats narrow to the requested width, and widen to
//! NUMERIC through [`Decimal`].

use crate::value::{RangeBound, RangeValue, Value};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

// Range flag bits (from PostgreSQL rangetypes.h)
const RANGE_EMPTY: u8 = 0x01;
const RANGE_HAS_LOWER: u8 = 0x02;
const RANGE_HAS_UPPER: u8 = 0x04;
const RANGE_LOWER_INCLUSIVE: u8 = 0x08;
const RANGE_UPPER_INCLUSIVE: u8 = 0x10;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => encode(self, b, ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => encode(self, &i16::try_from(*i)?, ty, out),
                Type::INT4 => encode(self, &i32::try_from(*i)?, ty, out),
                Type::FLOAT4 => encode(self, &(*i as f32), ty, out),
                Type::FLOAT8 => encode(self, &(*i as f64), ty, out),
                Type::NUMERIC => encode(self, &Decimal::from(*i), ty, out),
                _ => encode(self, i, ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => encode(self, &(*f as f32), ty, out),
                Type::NUMERIC => encode(self, &Decimal::try_from(*f)?, ty, out),
                _ => encode(self, f, ty, out),
            },
            Value::Text(s) => match *ty {
                Type::UUID => encode(self, &Uuid::parse_str(s)?, ty, out),
                Type::NUMERIC => encode(self, &Decimal::from_str_exact(s)?, ty, out),
                _ => encode(self, &s.as_str(), ty, out),
            },
            Value::Bytes(b) => encode(self, &b.as_slice(), ty, out),
            Value::Date(d) => encode(self, d, ty, out),
            Value::Timestamp(t) => match *ty {
                Type::TIMESTAMP => encode(self, &t.naive_utc(), ty, out),
                _ => encode(self, t, ty, out),
            },
            Value::Uuid(u) => encode(self, u, ty, out),
            Value::Json(j) => encode(self, j, ty, out),
            Value::Array(items) => encode(self, &items.as_slice(), ty, out),
            Value::Range(range) => encode_range(range, ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Encode `inner` after checking that it can be sent as `ty`.
fn encode<T: ToSql>(
    value: &Value,
    inner: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, BoxError> {
    if !T::accepts(ty) {
        return Err(format!("cannot bind {} value as {ty}", value.kind()).into());
    }
    inner.to_sql(ty, out)
}

// ==================== Ranges ====================

fn range_element_type(range_ty: &Type) -> Option<Type> {
    match *range_ty {
        Type::INT4_RANGE => Some(Type::INT4),
        Type::INT8_RANGE => Some(Type::INT8),
        Type::NUM_RANGE => Some(Type::NUMERIC),
        Type::TS_RANGE => Some(Type::TIMESTAMP),
        Type::TSTZ_RANGE => Some(Type::TIMESTAMPTZ),
        Type::DATE_RANGE => Some(Type::DATE),
        _ => None,
    }
}

fn encode_range(range: &RangeValue, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let element_type = range_element_type(ty).ok_or_else(|| format!("cannot bind range value as {ty}"))?;

    if range.is_empty() {
        out.extend_from_slice(&[RANGE_EMPTY]);
        return Ok(IsNull::No);
    }

    let mut flags: u8 = 0;
    if range.lower.is_some() {
        flags |= RANGE_HAS_LOWER;
    }
    if range.upper.is_some() {
        flags |= RANGE_HAS_UPPER;
    }
    if let Some(RangeBound::Inclusive(_)) = &range.lower {
        flags |= RANGE_LOWER_INCLUSIVE;
    }
    if let Some(RangeBound::Inclusive(_)) = &range.upper {
        flags |= RANGE_UPPER_INCLUSIVE;
    }
    out.extend_from_slice(&[flags]);

    for bound in [&range.lower, &range.upper].into_iter().flatten() {
        encode_bound(bound.value(), &element_type, out)?;
    }
    Ok(IsNull::No)
}

/// Write one bound behind its 4-byte length prefix.
fn encode_bound(value: &Value, element_type: &Type, out: &mut BytesMut) -> Result<(), BoxError> {
    let len_pos = out.len();
    out.extend_from_slice(&[0u8; 4]);

    let start = out.len();
    let len = match value.to_sql(element_type, out)? {
        IsNull::Yes => -1,
        IsNull::No => i32::try_from(out.len() - start)?,
    };
    out[len_pos..len_pos + 4].copy_from_slice(&len.to_be_bytes());
    Ok(())
}
