//! Clause containers for SELECT, INSERT and UPDATE statements.
//!
//! Each template is a fixed set of named clauses, every one a [`Composition`]
//! that defaults to empty. [`Template::to_composition`] checks the mandatory
//! clauses and assembles everything in statement order, introducing each
//! non-empty clause with its keyword and ending the statement with `;`.
//!
//! # Example
//!
//! ```ignore
//! use sqlforge::{Composition, SelectTemplate, Template};
//!
//! let mut select = SelectTemplate::new();
//! select.from = Composition::text("\"users\"");
//! select.where_ = Composition::text("\"active\" = true");
//! // SELECT * FROM "users" WHERE "active" = true;
//! let sql = select.to_composition()?;
//! ```

mod insert;
mod select;
mod update;

pub use insert::InsertTemplate;
pub use select::SelectTemplate;
pub use update::UpdateTemplate;

use crate::error::{QueryError, QueryResult};
use crate::expr::Composition;

/// Behavior shared by the statement templates.
pub trait Template: Clone + Default {
    /// Statement kind, as used in error messages (`SELECT`).
    const KIND: &'static str;

    /// Legal clause names, in assembly order.
    const CLAUSES: &'static [&'static str];

    fn clause(&self, name: &str) -> Option<&Composition>;

    fn clause_mut(&mut self, name: &str) -> Option<&mut Composition>;

    /// Check mandatory clauses and assemble the statement.
    fn to_composition(&self) -> QueryResult<Composition>;

    /// Seed a template from named clauses. Each clause is copied; names that
    /// are not clauses of this statement kind are ignored.
    fn from_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Composition)>,
    {
        let mut template = Self::default();
        for (name, composition) in parts {
            match template.clause_mut(name) {
                Some(clause) => *clause = composition.clone(),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        target: "sqlforge.statement",
                        kind = Self::KIND,
                        clause = name,
                        "ignoring unknown clause"
                    );
                }
            }
        }
        template
    }

    /// Replace one clause by name.
    fn set_clause(&mut self, name: &str, composition: Composition) -> QueryResult<&mut Self> {
        match self.clause_mut(name) {
            Some(clause) => {
                *clause = composition;
                Ok(self)
            }
            None => Err(QueryError::usage(format!(
                "{name:?} is not a clause of {} statements (expected one of {:?})",
                Self::KIND,
                Self::CLAUSES
            ))),
        }
    }

    /// Copy every clause of `other` into `self`.
    fn assign(&mut self, other: &Self) -> &mut Self {
        for name in Self::CLAUSES {
            if let (Some(src), Some(dst)) = (other.clause(name), self.clause_mut(name)) {
                *dst = src.clone();
            }
        }
        self
    }
}

/// Declares a template struct and its name-based clause access.
macro_rules! define_template {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$fmeta:meta])* $field:ident => $clause:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $crate::expr::Composition,)*
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl $crate::statement::Template for $name {
            const KIND: &'static str = $kind;
            const CLAUSES: &'static [&'static str] = &[$($clause),*];

            fn clause(&self, name: &str) -> Option<&$crate::expr::Composition> {
                match name {
                    $($clause => Some(&self.$field),)*
                    _ => None,
                }
            }

            fn clause_mut(&mut self, name: &str) -> Option<&mut $crate::expr::Composition> {
                match name {
                    $($clause => Some(&mut self.$field),)*
                    _ => None,
                }
            }

            fn to_composition(&self) -> $crate::error::QueryResult<$crate::expr::Composition> {
                self.assemble()
            }
        }
    };
}

use define_template;

/// Append ` <keyword> <clause>` (or ` <clause>` without keyword) when the clause is non-empty.
fn push_clause(out: &mut Composition, keyword: &str, clause: &Composition) {
    if clause.is_empty() {
        return;
    }
    if keyword.is_empty() {
        out.add(" ");
    } else {
        out.add(format!(" {keyword} "));
    }
    out.add(clause);
}

fn require(clause: &Composition, name: &'static str, statement: &'static str) -> QueryResult<()> {
    if clause.is_empty() {
        Err(QueryError::MissingClause {
            clause: name,
            statement,
        })
    } else {
        Ok(())
    }
}
