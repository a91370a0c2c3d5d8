//! Turn a [`Composition`] into final SQL text plus an ordered parameter list.
//!
//! Text items are copied verbatim. Every slot is validated against its type and
//! then either inlined through [`Dialect::write_value`] or registered as a
//! bound parameter, depending on the [`BindStyle`] (slots created with the
//! `inline` option are always inlined). A placeholder left in the composition
//! is an error.

use crate::data_type::DataType;
use crate::dialect::{Dialect, coerce_value};
use crate::error::{QueryError, QueryResult};
use crate::expr::{Composition, Item};
use crate::value::Value;
use serde::Deserialize;

/// How slot values reach the SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindStyle {
    /// Escaped literals are written into the SQL text.
    Inline,
    /// Values are collected into [`RenderedQuery::params`] and replaced by
    /// the dialect's placeholder (`$1`, `?`).
    #[default]
    Positional,
}

/// Final SQL text and its bound parameters, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl RenderedQuery {
    /// Parameters in the shape `tokio_postgres` expects.
    #[cfg(feature = "postgres")]
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.params
            .iter()
            .map(|v| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

/// Render `composition` for `dialect`.
pub fn render(
    composition: &Composition,
    dialect: &dyn Dialect,
    style: BindStyle,
) -> QueryResult<RenderedQuery> {
    let mut out = RenderedQuery::default();

    for item in composition.items() {
        match item {
            Item::Text(text) => out.sql.push_str(text),
            Item::Placeholder(p) => {
                return Err(QueryError::UnresolvedPlaceholder(p.name().to_string()));
            }
            Item::Slot(slot) => {
                let ty = slot.data_type();
                let value = coerce_value(slot.value(), ty);
                if let Some(ty) = ty {
                    ty.validate(&value, slot.options().accept_strings)?;
                }

                let is_json = ty.is_some_and(DataType::is_json) && !value.is_null();
                let mut value_sql = String::new();
                if style == BindStyle::Inline || slot.options().inline {
                    dialect.write_value(&mut value_sql, &value, ty)?;
                } else {
                    out.params.push(value.into_owned());
                    dialect.write_bind_placeholder(&mut value_sql, out.params.len());
                }

                if is_json {
                    dialect.write_json_operand(&mut out.sql, &value_sql);
                } else {
                    out.sql.push_str(&value_sql);
                }
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "sqlforge.render",
        dialect = dialect.name(),
        param_count = out.params.len(),
        "rendered statement"
    );
    #[cfg(feature = "tracing")]
    tracing::trace!(target: "sqlforge.render", sql = %out.sql, params = ?out.params);

    Ok(out)
}
