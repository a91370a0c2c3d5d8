//! Query generator: one dialect, one alias table, one bind style.
//!
//! [`QueryGenerator`] ties the pieces together. It normalizes operator
//! aliases, compiles conditions, fills the statement templates from simple
//! option structs and renders the result.
//!
//! # Example
//!
//! ```ignore
//! use sqlforge::{DialectKind, Op, QueryGenerator, SelectOptions, WhereMap};
//!
//! let generator = QueryGenerator::for_kind(DialectKind::Postgres);
//! let select = generator.select_query(
//!     "users",
//!     &SelectOptions::new()
//!         .filter(WhereMap::new().with("age", WhereMap::new().with(Op::Gte, 18)))
//!         .limit(10),
//! )?;
//! // SELECT * FROM "users" WHERE "age" >= $1 LIMIT 10;
//! let query = generator.render(&select)?;
//! ```

use crate::condition::{Condition, SqlExpr};
use crate::config::GeneratorConfig;
use crate::data_type::FieldResolver;
use crate::dialect::{Dialect, DialectKind, IgnoreStyle, LockMode};
use crate::error::QueryResult;
use crate::expr::{Composition, CompositionGroup, Slot};
use crate::operators::AliasTable;
use crate::render::{BindStyle, RenderedQuery, render};
use crate::statement::{InsertTemplate, SelectTemplate, Template, UpdateTemplate};
use crate::value::Value;
use crate::where_sql::WhereCompiler;
use std::fmt;
use std::sync::Arc;

/// Sort direction of an ORDER BY term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// ==================== Options ====================

/// What to select, for [`QueryGenerator::select_query`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Selected expressions with optional aliases; `*` when empty.
    pub attributes: Vec<(SqlExpr, Option<String>)>,
    /// Complete join clauses, emitted verbatim.
    pub joins: Vec<String>,
    pub where_: Option<Condition>,
    pub group: Vec<SqlExpr>,
    pub having: Option<Condition>,
    pub order: Vec<(SqlExpr, SortOrder)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: Option<LockMode>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, expr: SqlExpr) -> Self {
        self.attributes.push((expr, None));
        self
    }

    /// Select `expr AS "alias"`.
    pub fn attribute_as(mut self, expr: SqlExpr, alias: impl Into<String>) -> Self {
        self.attributes.push((expr, Some(alias.into())));
        self
    }

    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.where_ = Some(condition.into());
        self
    }

    pub fn group_by(mut self, expr: SqlExpr) -> Self {
        self.group.push(expr);
        self
    }

    pub fn having(mut self, condition: impl Into<Condition>) -> Self {
        self.having = Some(condition.into());
        self
    }

    pub fn order_by(mut self, expr: SqlExpr, order: SortOrder) -> Self {
        self.order.push((expr, order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn lock(mut self, lock: LockMode) -> Self {
        self.lock = Some(lock);
        self
    }
}

/// Rows to insert, for [`QueryGenerator::insert_query`].
///
/// Rows may name different columns; the statement lists the union in
/// first-seen order and fills the gaps with the dialect's default marker.
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    pub rows: Vec<Vec<(String, Value)>>,
    pub ignore_duplicates: bool,
    /// Columns to return; an empty list returns every column.
    pub returning: Option<Vec<String>>,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.rows
            .push(row.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn ignore_duplicates(mut self) -> Self {
        self.ignore_duplicates = true;
        self
    }

    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Assignments and filter, for [`QueryGenerator::update_query`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub values: Vec<(String, Value)>,
    pub where_: Option<Condition>,
    pub limit: Option<u64>,
    pub returning: Option<Vec<String>>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.where_ = Some(condition.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

// ==================== Generator ====================

/// Compiles conditions and statements for one dialect.
#[derive(Clone)]
pub struct QueryGenerator {
    dialect: Arc<dyn Dialect>,
    aliases: Option<AliasTable>,
    bind: BindStyle,
    resolver: Option<Arc<dyn FieldResolver>>,
}

impl fmt::Debug for QueryGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryGenerator")
            .field("dialect", &self.dialect.name())
            .field("aliases", &self.aliases.as_ref().map(AliasTable::len))
            .field("bind", &self.bind)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl QueryGenerator {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            aliases: None,
            bind: BindStyle::default(),
            resolver: None,
        }
    }

    pub fn for_kind(kind: DialectKind) -> Self {
        Self::new(kind.dialect())
    }

    /// Build a generator from configuration.
    ///
    /// Fails if a custom operator alias names an unknown operator.
    pub fn from_config(config: &GeneratorConfig) -> QueryResult<Self> {
        let mut generator = Self::for_kind(config.dialect).with_bind_style(config.bind);
        generator.set_operators_aliases(config.alias_table()?);
        Ok(generator)
    }

    pub fn with_bind_style(mut self, bind: BindStyle) -> Self {
        self.bind = bind;
        self
    }

    /// Resolve attribute columns and types through `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<dyn FieldResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_operators_aliases(mut self, aliases: Option<AliasTable>) -> Self {
        self.set_operators_aliases(aliases);
        self
    }

    /// Replace the alias table. `None` or an empty table disables translation.
    pub fn set_operators_aliases(&mut self, aliases: Option<AliasTable>) {
        self.aliases = aliases.filter(|table| !table.is_empty());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlforge.operators",
            aliases = self.aliases.as_ref().map_or(0, AliasTable::len),
            "operator aliases replaced"
        );
    }

    pub fn operators_aliases(&self) -> Option<&AliasTable> {
        self.aliases.as_ref()
    }

    pub fn dialect(&self) -> &dyn Dialect {
        &*self.dialect
    }

    pub fn bind_style(&self) -> BindStyle {
        self.bind
    }

    /// A where compiler sharing this generator's dialect and resolver.
    ///
    /// The compiler sees canonical operators only; aliases are replaced by
    /// [`where_query`](Self::where_query).
    pub fn compiler(&self) -> WhereCompiler<'_> {
        let compiler = WhereCompiler::new(&*self.dialect);
        match &self.resolver {
            Some(resolver) => compiler.with_resolver(&**resolver),
            None => compiler,
        }
    }

    /// Compile a condition, without the `WHERE` keyword. An empty composition
    /// means "no restriction".
    pub fn where_query(&self, condition: impl Into<Condition>) -> QueryResult<Composition> {
        let condition = condition.into();
        let condition = match &self.aliases {
            Some(table) => table.replace_aliases(condition),
            None => condition,
        };
        self.compiler().format_where_options(&condition)
    }

    /// Render a composition with this generator's dialect and bind style.
    pub fn render(&self, composition: &Composition) -> QueryResult<RenderedQuery> {
        render(composition, &*self.dialect, self.bind)
    }

    // ==================== Statements ====================

    pub fn select_query(&self, table: &str, options: &SelectOptions) -> QueryResult<Composition> {
        let compiler = self.compiler();
        let mut select = SelectTemplate::new();

        let mut attributes = Vec::with_capacity(options.attributes.len());
        for (expr, alias) in &options.attributes {
            let mut attr = compiler.format_expr(expr)?;
            if let Some(alias) = alias {
                attr.add(format!(" AS {}", self.dialect.quote_identifier(alias)));
            }
            attributes.push(attr);
        }
        select.attributes = join_list(attributes, ", ")?;
        select.from = self.table(table)?;
        select.join = Composition::text(options.joins.join(" "));

        if let Some(condition) = &options.where_ {
            select.where_ = self.where_query(condition.clone())?;
        }
        select.group = join_list(
            options
                .group
                .iter()
                .map(|expr| compiler.format_expr(expr))
                .collect::<QueryResult<_>>()?,
            ", ",
        )?;
        if let Some(condition) = &options.having {
            select.having = self.where_query(condition.clone())?;
        }

        let mut order = Vec::with_capacity(options.order.len());
        for (expr, direction) in &options.order {
            let mut term = compiler.format_expr(expr)?;
            term.add(format!(" {}", direction.keyword()));
            order.push(term);
        }
        select.order = join_list(order, ", ")?;

        let mut page = String::new();
        self.dialect
            .write_pagination(&mut page, options.limit, options.offset);
        select.page = Composition::text(page);

        if let Some(lock) = options.lock {
            let mut sql = String::new();
            self.dialect.write_lock(&mut sql, lock)?;
            select.lock = Composition::text(sql);
        }

        select.to_composition()
    }

    pub fn insert_query(&self, table: &str, options: &InsertOptions) -> QueryResult<Composition> {
        let mut insert = InsertTemplate::new();
        insert.table = self.table(table)?;

        let mut columns: Vec<&str> = Vec::new();
        for row in &options.rows {
            for (column, _) in row {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }

        if !options.rows.is_empty() {
            insert.attributes = Composition::text(
                columns
                    .iter()
                    .map(|column| self.quote_column(column))
                    .collect::<Vec<_>>()
                    .join(", "),
            );

            let mut default_value = String::new();
            self.dialect.write_default_value(&mut default_value);

            let mut tuples = Vec::with_capacity(options.rows.len());
            for row in &options.rows {
                let mut tuple = Composition::text("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        tuple.add(", ");
                    }
                    match row.iter().find(|(c, _)| c == column) {
                        Some((_, value)) => tuple.add(self.slot(column, value)),
                        None => tuple.add(default_value.as_str()),
                    };
                }
                tuple.add(")");
                tuples.push(tuple);
            }
            insert.values = join_list(tuples, ", ")?;
            insert.values.prepend("VALUES ");
        }

        if options.ignore_duplicates {
            match self.dialect.ignore_duplicates() {
                IgnoreStyle::Flag(flag) => insert.flags = Composition::text(flag),
                IgnoreStyle::OnConflict(clause) => insert.on_conflict = Composition::text(clause),
            }
        }
        if let Some(returning) = &options.returning {
            insert.returning = self.returning(returning)?;
        }

        insert.to_composition()
    }

    pub fn update_query(&self, table: &str, options: &UpdateOptions) -> QueryResult<Composition> {
        let mut update = UpdateTemplate::new();
        update.table = self.table(table)?;

        let assignments = options
            .values
            .iter()
            .map(|(column, value)| {
                let mut assignment = Composition::text(format!("{} = ", self.quote_column(column)));
                assignment.add(self.slot(column, value));
                assignment
            })
            .collect();
        update.values = join_list(assignments, ", ")?;

        if let Some(condition) = &options.where_ {
            update.where_ = self.where_query(condition.clone())?;
        }
        if let Some(limit) = options.limit {
            let mut sql = String::new();
            self.dialect.write_update_limit(&mut sql, limit)?;
            update.limit = Composition::text(sql);
        }
        if let Some(returning) = &options.returning {
            update.returning = self.returning(returning)?;
        }

        update.to_composition()
    }

    // ==================== Helpers ====================

    fn table(&self, table: &str) -> QueryResult<Composition> {
        self.compiler().format_expr(&SqlExpr::col(table))
    }

    /// Column of an attribute, quoted.
    fn quote_column(&self, attribute: &str) -> String {
        let field = self
            .resolver
            .as_ref()
            .and_then(|resolver| resolver.find_field(attribute));
        match field {
            Some(field) => self.dialect.quote_identifier(&field.column),
            None => self.dialect.quote_identifier(attribute),
        }
    }

    fn slot(&self, attribute: &str, value: &Value) -> Slot {
        let slot = Slot::new(value.clone());
        match self
            .resolver
            .as_ref()
            .and_then(|resolver| resolver.find_field(attribute))
        {
            Some(field) => slot.with_field(field),
            None => slot,
        }
    }

    fn returning(&self, columns: &[String]) -> QueryResult<Composition> {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_column(c)).collect();
        let mut sql = String::new();
        self.dialect.write_returning(&mut sql, &quoted)?;
        Ok(Composition::text(sql))
    }
}

fn join_list(parts: Vec<Composition>, separator: &str) -> QueryResult<Composition> {
    CompositionGroup::from_pieces(parts)
        .space(Composition::text(separator))
        .to_composition()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::WhereMap;
    use crate::data_type::{DataType, Field, Schema};
    use crate::operators::Op;

    fn pg() -> QueryGenerator {
        QueryGenerator::for_kind(DialectKind::Postgres)
    }

    #[test]
    fn select_with_every_option() {
        let generator = pg();
        let options = SelectOptions::new()
            .attribute(SqlExpr::attr("id"))
            .attribute_as(SqlExpr::func("count", vec![SqlExpr::literal("*")]), "total")
            .filter(WhereMap::new().with("age", WhereMap::new().with(Op::Gte, 18)))
            .group_by(SqlExpr::attr("id"))
            .order_by(SqlExpr::attr("id"), SortOrder::Desc)
            .limit(10)
            .offset(20)
            .lock(LockMode::Update);

        let query = generator
            .render(&generator.select_query("users", &options).unwrap())
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT \"id\", count(*) AS \"total\" FROM \"users\" WHERE \"age\" >= $1 \
             GROUP BY \"id\" ORDER BY \"id\" DESC LIMIT 10 OFFSET 20 FOR UPDATE;"
        );
        assert_eq!(query.params, vec![Value::Int(18)]);
    }

    #[test]
    fn select_without_options() {
        let generator = pg();
        let select = generator.select_query("public.users", &SelectOptions::new()).unwrap();
        assert_eq!(select.to_string(), "SELECT * FROM \"public\".\"users\";");
    }

    #[test]
    fn insert_fills_missing_columns() {
        let generator = pg();
        let options = InsertOptions::new()
            .row([("name", Value::from("a")), ("age", Value::from(3))])
            .row([("name", Value::from("b"))])
            .ignore_duplicates()
            .returning(["id"]);

        let query = generator
            .render(&generator.insert_query("users", &options).unwrap())
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO \"users\" (\"name\", \"age\") VALUES ($1, $2), ($3, DEFAULT) \
             ON CONFLICT DO NOTHING RETURNING \"id\";"
        );
        assert_eq!(query.params.len(), 3);
    }

    #[test]
    fn insert_without_rows_fails() {
        let err = pg().insert_query("users", &InsertOptions::new()).unwrap_err();
        assert!(err.is_missing_clause());
    }

    #[test]
    fn sqlite_insert_uses_flag_and_null() {
        let generator = QueryGenerator::for_kind(DialectKind::Sqlite);
        let options = InsertOptions::new()
            .row([("a", 1)])
            .row([("b", 2)])
            .ignore_duplicates();
        let select = generator.insert_query("t", &options).unwrap();
        assert_eq!(
            select.to_string(),
            "INSERT OR IGNORE INTO `t` (`a`, `b`) VALUES (?, NULL), (NULL, ?);"
        );
    }

    #[test]
    fn update_with_limit() {
        let generator = QueryGenerator::for_kind(DialectKind::Mysql).with_bind_style(BindStyle::Inline);
        let options = UpdateOptions::new()
            .set("name", "x")
            .filter(WhereMap::new().with("id", 1))
            .limit(1);

        let query = generator
            .render(&generator.update_query("users", &options).unwrap())
            .unwrap();
        assert_eq!(query.sql, "UPDATE `users` SET `name` = 'x' WHERE `id` = 1 LIMIT 1;");

        let err = pg().update_query("users", &options).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn resolver_maps_columns_and_types() {
        let schema = Schema::new()
            .with_field(Field::new("createdAt", DataType::Timestamp).with_column("created_at"))
            .field("meta", DataType::Jsonb);
        let generator = pg()
            .with_resolver(Arc::new(schema))
            .with_bind_style(BindStyle::Inline);

        let options = UpdateOptions::new()
            .set("meta", "v")
            .set("createdAt", Value::Null)
            .returning(Vec::<String>::new());
        let query = generator
            .render(&generator.update_query("users", &options).unwrap())
            .unwrap();
        assert_eq!(
            query.sql,
            "UPDATE \"users\" SET \"meta\" = '\"v\"', \"created_at\" = NULL RETURNING *;"
        );
    }

    #[test]
    fn aliases_are_replaced_before_compiling() {
        let mut generator = pg().with_operators_aliases(Some(AliasTable::legacy()));
        let sql = generator
            .where_query(Condition::from_json(serde_json::json!({"age": {"$gt": 5}})))
            .unwrap();
        assert_eq!(sql.to_string(), "\"age\" > ?");

        // without aliases `$gt` is just a JSON key
        generator.set_operators_aliases(Some(AliasTable::new()));
        assert!(generator.operators_aliases().is_none());
        let sql = generator
            .where_query(Condition::from_json(serde_json::json!({"age": {"$gt": 5}})))
            .unwrap();
        assert_eq!(sql.to_string(), "\"age\"->'$gt' = ?");
    }
}
