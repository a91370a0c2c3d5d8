//! Declared semantic types and the attribute resolver interface.
//!
//! The where compiler looks up the declared type of an attribute so a value is
//! escaped the way its column expects (JSON text for JSON columns, range
//! literals for range columns, and so on). Validation of a value against its
//! type happens at render time, see [`DataType::validate`].

use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Semantic type of a column or operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    BigInt,
    Float,
    Boolean,
    /// Variable-length string with a maximum length.
    Varchar(u32),
    Text,
    Date,
    Timestamp,
    Uuid,
    Json,
    Jsonb,
    Blob,
    Array(Box<DataType>),
    Range(Box<DataType>),
}

impl DataType {
    pub fn array(inner: DataType) -> Self {
        DataType::Array(Box::new(inner))
    }

    pub fn range(inner: DataType) -> Self {
        DataType::Range(Box::new(inner))
    }

    pub fn is_json(&self) -> bool {
        matches!(self, DataType::Json | DataType::Jsonb)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, DataType::Range(_))
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Varchar(_) | DataType::Text)
    }

    /// Element type of an array or range, `None` for scalar types.
    pub fn subtype(&self) -> Option<&DataType> {
        match self {
            DataType::Array(inner) | DataType::Range(inner) => Some(inner),
            _ => None,
        }
    }

    /// SQL spelling of the type, as written in casts.
    pub fn sql_name(&self) -> String {
        match self {
            DataType::Integer => "INTEGER".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::Float => "DOUBLE PRECISION".to_string(),
            DataType::Boolean => "BOOLEAN".to_string(),
            DataType::Varchar(len) => format!("VARCHAR({len})"),
            DataType::Text => "TEXT".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Timestamp => "TIMESTAMP WITH TIME ZONE".to_string(),
            DataType::Uuid => "UUID".to_string(),
            DataType::Json => "JSON".to_string(),
            DataType::Jsonb => "JSONB".to_string(),
            DataType::Blob => "BYTEA".to_string(),
            DataType::Array(inner) => format!("{}[]", inner.sql_name()),
            DataType::Range(inner) => match inner.as_ref() {
                DataType::Integer => "INT4RANGE".to_string(),
                DataType::BigInt => "INT8RANGE".to_string(),
                DataType::Float => "NUMRANGE".to_string(),
                DataType::Date => "DATERANGE".to_string(),
                _ => "TSTZRANGE".to_string(),
            },
        }
    }

    /// Maps a cast type name (`int`, `varchar(20)`, `jsonb`, `text[]`...) back to
    /// a semantic type. Unknown names yield `None`.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if let Some(inner) = name.strip_suffix("[]") {
            return Self::from_sql_name(inner).map(DataType::array);
        }
        if let Some(len) = name
            .strip_prefix("varchar(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return len.trim().parse().ok().map(DataType::Varchar);
        }
        let ty = match name.as_str() {
            "int" | "int4" | "integer" => DataType::Integer,
            "bigint" | "int8" => DataType::BigInt,
            "float" | "real" | "double" | "double precision" | "numeric" | "decimal" => {
                DataType::Float
            }
            "bool" | "boolean" => DataType::Boolean,
            "varchar" | "string" => DataType::Varchar(255),
            "text" => DataType::Text,
            "date" => DataType::Date,
            "timestamp" | "timestamptz" | "datetime" => DataType::Timestamp,
            "uuid" => DataType::Uuid,
            "json" => DataType::Json,
            "jsonb" => DataType::Jsonb,
            "blob" | "bytea" => DataType::Blob,
            "int4range" => DataType::range(DataType::Integer),
            "int8range" => DataType::range(DataType::BigInt),
            "numrange" => DataType::range(DataType::Float),
            "daterange" => DataType::range(DataType::Date),
            "tsrange" | "tstzrange" => DataType::range(DataType::Timestamp),
            _ => return None,
        };
        Some(ty)
    }

    /// Check that `value` can be escaped as this type.
    ///
    /// `accept_strings` lets any text through, which LIKE patterns rely on.
    pub fn validate(&self, value: &Value, accept_strings: bool) -> QueryResult<()> {
        if value.is_null() || (accept_strings && matches!(value, Value::Text(_))) {
            return Ok(());
        }

        let ok = match (self, value) {
            (DataType::Integer | DataType::BigInt, Value::Int(_)) => true,
            (DataType::Integer | DataType::BigInt, Value::Text(s)) => s.parse::<i64>().is_ok(),
            (DataType::Float, Value::Int(_) | Value::Float(_)) => true,
            (DataType::Float, Value::Text(s)) => s.parse::<f64>().is_ok(),
            (DataType::Boolean, Value::Bool(_)) => true,
            (DataType::Boolean, Value::Int(i)) => *i == 0 || *i == 1,
            (DataType::Varchar(len), Value::Text(s)) => s.chars().count() <= *len as usize,
            (DataType::Text, Value::Text(_)) => true,
            (DataType::Date, Value::Date(_) | Value::Timestamp(_)) => true,
            (DataType::Timestamp, Value::Timestamp(_) | Value::Date(_)) => true,
            (DataType::Date | DataType::Timestamp, Value::Text(_)) => true,
            (DataType::Uuid, Value::Uuid(_)) => true,
            (DataType::Uuid, Value::Text(s)) => uuid::Uuid::parse_str(s).is_ok(),
            (DataType::Json | DataType::Jsonb, _) => true,
            (DataType::Blob, Value::Bytes(_) | Value::Text(_)) => true,
            (DataType::Array(inner), Value::Array(items)) => {
                for item in items {
                    inner.validate(item, accept_strings)?;
                }
                true
            }
            (DataType::Range(inner), Value::Range(range)) => {
                for bound in [&range.lower, &range.upper].into_iter().flatten() {
                    inner.validate(bound.value(), false)?;
                }
                true
            }
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(QueryError::invalid_value(value.clone(), self.to_string()))
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}

/// A model attribute: its name in conditions, its column name, and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub column: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            data_type,
        }
    }

    /// Map the attribute to a differently named column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

/// Recovers the declared field of an attribute referenced by name.
pub trait FieldResolver: Send + Sync {
    fn find_field(&self, attribute: &str) -> Option<Arc<Field>>;
}

/// A set of fields, usually describing one table.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: HashMap<String, Arc<Field>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute whose column has the same name.
    pub fn field(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.with_field(Field::new(name, data_type))
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), Arc::new(field));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldResolver for Schema {
    fn find_field(&self, attribute: &str) -> Option<Arc<Field>> {
        self.fields.get(attribute).cloned()
    }
}
