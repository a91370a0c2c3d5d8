//! Generator configuration.
//!
//! A [`GeneratorConfig`] can be built in code with the `with_*` methods or
//! parsed from TOML:
//!
//! ```toml
//! dialect = "mysql"
//! bind = "inline"
//!
//! [operator_aliases.custom]
//! "^^" = "gt"
//! "!" = "not"
//! ```

use crate::dialect::DialectKind;
use crate::error::QueryResult;
use crate::operators::AliasTable;
use crate::render::BindStyle;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Which operator alias table a generator starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasConfig {
    /// Only canonical operators are recognized.
    #[default]
    None,
    /// The `$`-prefixed spellings (`$gt`, `$in`...).
    Legacy,
    /// Spelling -> canonical operator name.
    Custom(BTreeMap<String, String>),
}

/// Configuration for a [`QueryGenerator`](crate::QueryGenerator).
///
/// Identifiers are always quoted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Target engine. Default: `postgres`.
    pub dialect: DialectKind,
    /// Whether values are bound or inlined. Default: `positional`.
    pub bind: BindStyle,
    /// Operator alias table. Default: none.
    pub operator_aliases: AliasConfig,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> QueryResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_bind_style(mut self, bind: BindStyle) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_operator_aliases(mut self, aliases: AliasConfig) -> Self {
        self.operator_aliases = aliases;
        self
    }

    /// Build the configured alias table; `None` disables alias translation.
    ///
    /// Fails if a custom alias names an unknown operator.
    pub fn alias_table(&self) -> QueryResult<Option<AliasTable>> {
        Ok(match &self.operator_aliases {
            AliasConfig::None => None,
            AliasConfig::Legacy => Some(AliasTable::legacy()),
            AliasConfig::Custom(map) => Some(AliasTable::from_names(map)?),
        })
    }
}
