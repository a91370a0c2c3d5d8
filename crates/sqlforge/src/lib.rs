//! # sqlforge
//!
//! Declarative where-conditions and statement templates compiled to SQL for
//! PostgreSQL, MySQL and SQLite.
//!
//! ## Features
//!
//! - **Declarative conditions**: nested maps, lists and operators instead of SQL text
//! - **Safe by construction**: every value reaches SQL through a slot, escaped or bound
//! - **Dialect aware**: quoting, operators, JSON paths, pagination and locks per engine
//! - **Operator aliases**: legacy `$gt` spellings or a custom table, normalized in one pass
//! - **Statement templates**: SELECT / INSERT / UPDATE clause containers with fixed order
//! - **Postgres parameters**: `Value` implements `ToSql` (feature `postgres`)
//!
//! ## Example
//!
//! ```ignore
//! use sqlforge::{DialectKind, Op, QueryGenerator, WhereMap};
//!
//! let generator = QueryGenerator::for_kind(DialectKind::Postgres);
//!
//! // { active: true, age: { gt: 18 } }
//! let where_sql = generator.where_query(
//!     WhereMap::new()
//!         .with("active", true)
//!         .with("age", WhereMap::new().with(Op::Gt, 18)),
//! )?;
//!
//! let query = generator.render(&where_sql)?;
//! assert_eq!(query.sql, "\"active\" = $1 AND \"age\" > $2");
//! ```

pub mod condition;
pub mod config;
pub mod data_type;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod generator;
pub mod ident;
pub mod operators;
pub mod prelude;
pub mod render;
pub mod statement;
pub mod value;
pub mod where_sql;

#[cfg(feature = "postgres")]
mod pg;

pub use condition::{Condition, Key, PathSegment, SqlExpr, WhereMap};
pub use config::{AliasConfig, GeneratorConfig};
pub use data_type::{DataType, Field, FieldResolver, Schema};
pub use dialect::{
    Dialect, DialectKind, IgnoreStyle, LockMode, MySqlDialect, PostgresDialect, SqliteDialect,
};
pub use error::{QueryError, QueryResult};
pub use expr::{Composition, CompositionGroup, Item, Piece, Placeholder, Segment, Slot, SlotOptions};
pub use generator::{InsertOptions, QueryGenerator, SelectOptions, SortOrder, UpdateOptions};
pub use ident::Ident;
pub use operators::{AliasTable, Op, OperatorMap};
pub use render::{BindStyle, RenderedQuery, render};
pub use statement::{InsertTemplate, SelectTemplate, Template, UpdateTemplate};
pub use value::{RangeBound, RangeValue, Value};
pub use where_sql::WhereCompiler;
