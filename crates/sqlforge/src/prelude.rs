//! Convenient imports for typical `sqlforge` usage.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//! ```

pub use crate::{
    BindStyle, Composition, Condition, DialectKind, GeneratorConfig, Op, QueryError, QueryGenerator,
    QueryResult, RenderedQuery, SqlExpr, Template, Value, WhereMap,
};
pub use crate::{InsertOptions, SelectOptions, SortOrder, UpdateOptions};
