//! Operator identifiers, per-dialect keyword tables and alias resolution.
//!
//! [`Op`] is a closed set: a user-supplied string key can never be mistaken for
//! an operator. Alternate spellings (`$gt`, `'^^'`...) are mapped onto `Op`
//! by an [`AliasTable`] in a single normalization pass before compilation.

use crate::condition::{Condition, Key, WhereMap};
use crate::error::{QueryError, QueryResult};
use std::collections::HashMap;
use std::fmt;

macro_rules! define_ops {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// A comparison, logical or structural operator.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Op {
            $($variant),*
        }

        impl Op {
            /// Every operator, in declaration order.
            pub const ALL: &'static [Op] = &[$(Op::$variant),*];

            /// Canonical name, e.g. `notIn`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Op::$variant => $name),*
                }
            }

            /// Look up an operator by its canonical name.
            pub fn from_name(name: &str) -> Option<Op> {
                match name {
                    $($name => Some(Op::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_ops! {
    Eq => "eq",
    Ne => "ne",
    Gte => "gte",
    Gt => "gt",
    Lte => "lte",
    Lt => "lt",
    Is => "is",
    IsNot => "isNot",
    In => "in",
    NotIn => "notIn",
    Like => "like",
    NotLike => "notLike",
    ILike => "iLike",
    NotILike => "notILike",
    StartsWith => "startsWith",
    NotStartsWith => "notStartsWith",
    EndsWith => "endsWith",
    NotEndsWith => "notEndsWith",
    Substring => "substring",
    NotSubstring => "notSubstring",
    Regexp => "regexp",
    NotRegexp => "notRegexp",
    IRegexp => "iRegexp",
    NotIRegexp => "notIRegexp",
    Between => "between",
    NotBetween => "notBetween",
    Overlap => "overlap",
    Contains => "contains",
    Contained => "contained",
    Adjacent => "adjacent",
    StrictLeft => "strictLeft",
    StrictRight => "strictRight",
    NoExtendRight => "noExtendRight",
    NoExtendLeft => "noExtendLeft",
    And => "and",
    Or => "or",
    Not => "not",
    Any => "any",
    All => "all",
    Values => "values",
    Col => "col",
    Match => "match",
    AnyKeyExists => "anyKeyExists",
    AllKeysExist => "allKeysExist",
}

impl Op {
    /// `and`, `or` and `not`.
    pub fn is_logical(self) -> bool {
        matches!(self, Op::And | Op::Or | Op::Not)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Op.{}", self.name())
    }
}

// ==================== Keyword tables ====================

/// Rendered SQL keyword per operator for one dialect.
///
/// An operator without an entry is not supported by the dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorMap {
    keywords: HashMap<Op, &'static str>,
}

impl OperatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full keyword table, as understood by PostgreSQL.
    pub fn standard() -> Self {
        let entries: [(Op, &'static str); 33] = [
            (Op::Eq, "="),
            (Op::Ne, "!="),
            (Op::Gte, ">="),
            (Op::Gt, ">"),
            (Op::Lte, "<="),
            (Op::Lt, "<"),
            (Op::Is, "IS"),
            (Op::IsNot, "IS NOT"),
            (Op::In, "IN"),
            (Op::NotIn, "NOT IN"),
            (Op::Like, "LIKE"),
            (Op::NotLike, "NOT LIKE"),
            (Op::ILike, "ILIKE"),
            (Op::NotILike, "NOT ILIKE"),
            (Op::Regexp, "~"),
            (Op::NotRegexp, "!~"),
            (Op::IRegexp, "~*"),
            (Op::NotIRegexp, "!~*"),
            (Op::Between, "BETWEEN"),
            (Op::NotBetween, "NOT BETWEEN"),
            (Op::Overlap, "&&"),
            (Op::Contains, "@>"),
            (Op::Contained, "<@"),
            (Op::Adjacent, "-|-"),
            (Op::StrictLeft, "<<"),
            (Op::StrictRight, ">>"),
            (Op::NoExtendRight, "&<"),
            (Op::NoExtendLeft, "&>"),
            (Op::Any, "ANY"),
            (Op::All, "ALL"),
            (Op::Match, "@@"),
            (Op::AnyKeyExists, "?|"),
            (Op::AllKeysExist, "?&"),
        ];
        Self {
            keywords: entries.into_iter().collect(),
        }
    }

    /// Set the keyword for `op`.
    pub fn with(mut self, op: Op, keyword: &'static str) -> Self {
        self.keywords.insert(op, keyword);
        self
    }

    /// Remove `op` from the table.
    pub fn without(mut self, ops: &[Op]) -> Self {
        for op in ops {
            self.keywords.remove(op);
        }
        self
    }

    pub fn get(&self, op: Op) -> Option<&'static str> {
        self.keywords.get(&op).copied()
    }

    pub fn supports(&self, op: Op) -> bool {
        self.keywords.contains_key(&op)
    }
}

// ==================== Aliases ====================

/// Maps alternate operator spellings onto canonical operators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: HashMap<String, Op>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `$`-prefixed spellings (`$gt`, `$notIn`, `$and`...).
    pub fn legacy() -> Self {
        const LEGACY: &[Op] = &[
            Op::Eq,
            Op::Ne,
            Op::Gte,
            Op::Gt,
            Op::Lte,
            Op::Lt,
            Op::Not,
            Op::In,
            Op::NotIn,
            Op::Is,
            Op::Like,
            Op::NotLike,
            Op::ILike,
            Op::NotILike,
            Op::Regexp,
            Op::NotRegexp,
            Op::IRegexp,
            Op::NotIRegexp,
            Op::Between,
            Op::NotBetween,
            Op::Overlap,
            Op::Contains,
            Op::Contained,
            Op::Adjacent,
            Op::StrictLeft,
            Op::StrictRight,
            Op::NoExtendRight,
            Op::NoExtendLeft,
            Op::And,
            Op::Or,
            Op::Any,
            Op::All,
            Op::Values,
            Op::Col,
        ];
        Self {
            aliases: LEGACY
                .iter()
                .map(|op| (format!("${}", op.name()), *op))
                .collect(),
        }
    }

    /// Add an alias.
    pub fn alias(mut self, spelling: impl Into<String>, op: Op) -> Self {
        self.aliases.insert(spelling.into(), op);
        self
    }

    /// Build a table from `spelling -> canonical operator name` pairs.
    pub fn from_names<I, K, V>(pairs: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut table = Self::new();
        for (spelling, name) in pairs {
            let name = name.as_ref();
            let op = Op::from_name(name)
                .ok_or_else(|| QueryError::config(format!("unknown operator {name:?}")))?;
            table.aliases.insert(spelling.into(), op);
        }
        Ok(table)
    }

    pub fn get(&self, spelling: &str) -> Option<Op> {
        self.aliases.get(spelling).copied()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Rewrite every map key that matches an alias into its operator.
    ///
    /// Recurses into map values and list elements; terminal values and
    /// already-canonical keys are left as they are.
    pub fn replace_aliases(&self, condition: Condition) -> Condition {
        if self.is_empty() {
            return condition;
        }
        match condition {
            Condition::Map(map) => Condition::Map(
                map.into_iter()
                    .map(|(key, value)| {
                        let key = match key {
                            Key::Attr(name) => self.get(&name).map_or(Key::Attr(name), Key::Op),
                            op => op,
                        };
                        (key, self.replace_aliases(value))
                    })
                    .collect::<WhereMap>(),
            ),
            Condition::List(items) => Condition::List(
                items
                    .into_iter()
                    .map(|item| self.replace_aliases(item))
                    .collect(),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn names_round_trip() {
        for op in Op::ALL {
            assert_eq!(Op::from_name(op.name()), Some(*op));
        }
        assert_eq!(Op::from_name("$gt"), None);
    }

    #[test]
    fn standard_map_has_no_keyword_for_structural_ops() {
        let map = OperatorMap::standard();
        assert_eq!(map.get(Op::NotIn), Some("NOT IN"));
        assert_eq!(map.get(Op::Overlap), Some("&&"));
        for op in [Op::And, Op::Or, Op::Not, Op::Col, Op::Values, Op::StartsWith] {
            assert!(!map.supports(op), "{op} should not have a keyword");
        }
    }

    #[test]
    fn legacy_aliases() {
        let table = AliasTable::legacy();
        assert_eq!(table.get("$gt"), Some(Op::Gt));
        assert_eq!(table.get("$notIn"), Some(Op::NotIn));
        assert_eq!(table.get("$col"), Some(Op::Col));
        assert_eq!(table.get("gt"), None);
    }

    #[test]
    fn replace_aliases_recurses_into_maps_and_lists() {
        let table = AliasTable::new()
            .alias("OR", Op::Or)
            .alias("!", Op::Not)
            .alias("^^", Op::Gt);

        let input = Condition::map(
            WhereMap::new()
                .with("OR", vec![
                    Condition::map(WhereMap::new().with("test", WhereMap::new().with("^^", 5))),
                    Condition::map(WhereMap::new().with("test", WhereMap::new().with("!", 3))),
                ])
                .with("name", "^^"),
        );

        let expected = Condition::map(
            WhereMap::new()
                .with(Op::Or, vec![
                    Condition::map(WhereMap::new().with("test", WhereMap::new().with(Op::Gt, 5))),
                    Condition::map(WhereMap::new().with("test", WhereMap::new().with(Op::Not, 3))),
                ])
                .with("name", "^^"),
        );

        assert_eq!(table.replace_aliases(input), expected);
    }

    #[test]
    fn empty_table_is_identity() {
        let input = Condition::map(WhereMap::new().with("$gt", Value::Int(1)));
        assert_eq!(AliasTable::new().replace_aliases(input.clone()), input);
    }

    #[test]
    fn from_names_rejects_unknown_operators() {
        let table = AliasTable::from_names([("~>", "gt")]).unwrap();
        assert_eq!(table.get("~>"), Some(Op::Gt));
        assert!(AliasTable::from_names([("~>", "greater")]).is_err());
    }
}
