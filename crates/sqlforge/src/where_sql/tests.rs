use super::*;
use crate::condition::WhereMap;
use crate::data_type::{Field, Schema};
use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
use crate::render::{BindStyle, render};
use crate::value::RangeValue;

fn map() -> WhereMap {
    WhereMap::new()
}

fn compile(dialect: &dyn Dialect, cond: impl Into<Condition>) -> QueryResult<Composition> {
    WhereCompiler::new(dialect).format_where_options(&cond.into())
}

/// Positional SQL and parameters on PostgreSQL.
fn pg(cond: impl Into<Condition>) -> (String, Vec<Value>) {
    let dialect = PostgresDialect::new();
    let sql = compile(&dialect, cond).unwrap();
    let q = render(&sql, &dialect, BindStyle::Positional).unwrap();
    (q.sql, q.params)
}

/// Inline SQL for any dialect.
fn inline(dialect: &dyn Dialect, cond: impl Into<Condition>) -> String {
    let sql = compile(dialect, cond).unwrap();
    render(&sql, dialect, BindStyle::Inline).unwrap().sql
}

fn pg_inline(cond: impl Into<Condition>) -> String {
    inline(&PostgresDialect::new(), cond)
}

fn schema() -> Schema {
    Schema::new()
        .field("age", DataType::Integer)
        .field("name", DataType::Text)
        .field("meta", DataType::Jsonb)
        .field("tags", DataType::array(DataType::Text))
        .field("period", DataType::range(DataType::Integer))
        .with_field(Field::new("createdAt", DataType::Timestamp).with_column("created_at"))
}

fn with_schema(cond: impl Into<Condition>) -> String {
    let dialect = PostgresDialect::new();
    let schema = schema();
    let sql = WhereCompiler::new(&dialect)
        .with_resolver(&schema)
        .format_where_options(&cond.into())
        .unwrap();
    render(&sql, &dialect, BindStyle::Inline).unwrap().sql
}

// ==================== Top level ====================

#[test]
fn attributes_are_joined_with_and() {
    let (sql, params) = pg(map().with("active", true).with("age", map().with(Op::Gt, 18)));
    assert_eq!(sql, r#""active" = $1 AND "age" > $2"#);
    assert_eq!(params, vec![Value::Bool(true), Value::Int(18)]);
}

#[test]
fn lists_are_an_implicit_and() {
    let (sql, _) = pg(vec![
        Condition::map(map().with("a", 1)),
        Condition::map(map().with("b", 2)),
    ]);
    assert_eq!(sql, r#""a" = $1 AND "b" = $2"#);
}

#[test]
fn nested_groups_are_parenthesized() {
    let cond = map().with(
        Op::Or,
        vec![
            Condition::map(map().with("a", 1)),
            Condition::map(map().with(
                Op::And,
                vec![
                    Condition::map(map().with("b", 2)),
                    Condition::map(map().with("c", 3)),
                ],
            )),
        ],
    );
    let (sql, params) = pg(cond);
    assert_eq!(sql, r#""a" = $1 OR ("b" = $2 AND "c" = $3)"#);
    assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn or_over_a_map() {
    let (sql, _) = pg(map().with(Op::Or, map().with("a", 5).with("b", 6)));
    assert_eq!(sql, r#""a" = $1 OR "b" = $2"#);
}

#[test]
fn not_wraps_its_operand() {
    let (sql, _) = pg(map().with(Op::Not, map().with("a", 1).with("b", 2)));
    assert_eq!(sql, r#"NOT ("a" = $1 AND "b" = $2)"#);
}

#[test]
fn not_of_empty_is_always_false() {
    let (sql, params) = pg(map().with(Op::Not, map()));
    assert_eq!(sql, "0 = 1");
    assert!(params.is_empty());

    let (sql, _) = pg(map().with(Op::Not, map().with("x", map().with(Op::NotIn, Vec::<i32>::new()))));
    assert_eq!(sql, "0 = 1");
}

#[test]
fn empty_condition_compiles_to_nothing() {
    assert!(compile(&PostgresDialect::new(), map()).unwrap().is_empty());
    assert!(compile(&PostgresDialect::new(), Vec::<Condition>::new()).unwrap().is_empty());
}

#[test]
fn operators_other_than_logical_are_rejected_at_top_level() {
    let err = compile(&PostgresDialect::new(), map().with(Op::Gt, 1)).unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().contains("Op.gt"));
}

#[test]
fn bare_values_are_rejected_at_top_level() {
    let err = compile(&PostgresDialect::new(), 5).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn expressions_at_top_level() {
    let (sql, params) = pg(SqlExpr::where_op(
        SqlExpr::func("lower", vec![SqlExpr::col("name")]),
        Op::Eq,
        "bob",
    ));
    assert_eq!(sql, r#"lower("name") = $1"#);
    assert_eq!(params, vec![Value::from("bob")]);

    assert_eq!(pg_inline(SqlExpr::literal("1 = 1")), "1 = 1");
}

#[test]
fn same_input_same_output() {
    let cond = Condition::map(
        map()
            .with("b", vec![1, 2])
            .with("a", map().with(Op::Between, vec![1, 10]))
            .with(Op::Or, vec![Condition::map(map().with("c", Value::Null))]),
    );
    assert_eq!(pg(cond.clone()), pg(cond));
}

// ==================== Operator inference ====================

#[test]
fn null_becomes_is_null() {
    assert_eq!(pg_inline(map().with("x", Value::Null)), r#""x" IS NULL"#);
    assert_eq!(pg_inline(map().with("x", map().with(Op::Is, Value::Null))), r#""x" IS NULL"#);
    assert_eq!(pg_inline(map().with("x", map().with(Op::Eq, Value::Null))), r#""x" IS NULL"#);
    assert_eq!(
        pg_inline(map().with("x", map().with(Op::Ne, Value::Null))),
        r#""x" IS NOT NULL"#
    );
}

#[test]
fn lists_become_in() {
    let (sql, params) = pg(map().with("x", vec![1, 2]));
    assert_eq!(sql, r#""x" IN ($1, $2)"#);
    assert_eq!(params, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn array_columns_compare_whole_arrays() {
    assert_eq!(
        with_schema(map().with("tags", vec!["a", "b"])),
        r#""tags" = ARRAY['a','b']::TEXT[]"#
    );
}

#[test]
fn json_null_must_be_explicit() {
    let dialect = PostgresDialect::new();
    let schema = schema();
    let compiler = WhereCompiler::new(&dialect).with_resolver(&schema);
    let err = compiler
        .format_where_options(&map().with("meta", Value::Null).into())
        .unwrap_err();
    assert!(err.is_usage());

    assert_eq!(
        with_schema(map().with("meta", map().with(Op::Is, Value::Null))),
        r#""meta" IS NULL"#
    );
}

// ==================== Handlers ====================

#[test]
fn in_and_not_in_with_empty_lists() {
    assert_eq!(
        pg_inline(map().with("x", map().with(Op::In, Vec::<i32>::new()))),
        r#""x" IN (NULL)"#
    );
    assert_eq!(pg_inline(map().with("x", map().with(Op::NotIn, Vec::<i32>::new()))), "");
    assert_eq!(
        pg_inline(
            map()
                .with("x", map().with(Op::NotIn, Vec::<i32>::new()))
                .with("y", 1)
        ),
        r#""y" = 1"#
    );
}

#[test]
fn in_accepts_literals_only_besides_lists() {
    assert_eq!(
        pg_inline(map().with("x", map().with(Op::NotIn, SqlExpr::literal("(SELECT 1)")))),
        r#""x" NOT IN (SELECT 1)"#
    );
    let err = compile(&PostgresDialect::new(), map().with("x", map().with(Op::In, 1))).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn is_takes_inline_booleans() {
    let (sql, params) = pg(map().with("flag", map().with(Op::Is, true)));
    assert_eq!(sql, r#""flag" IS true"#);
    assert!(params.is_empty());

    assert_eq!(
        inline(&SqliteDialect::new(), map().with("flag", map().with(Op::IsNot, false))),
        "`flag` IS NOT 0"
    );

    let err = compile(&PostgresDialect::new(), map().with("flag", map().with(Op::Is, 1))).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn between_needs_two_bounds() {
    let (sql, params) = pg(map().with("x", map().with(Op::Between, vec![1, 10])));
    assert_eq!(sql, r#""x" BETWEEN $1 AND $2"#);
    assert_eq!(params, vec![Value::Int(1), Value::Int(10)]);

    let (sql, _) = pg(map().with("x", map().with(Op::NotBetween, vec![1, 10])).with("y", 2));
    assert_eq!(sql, r#"("x" NOT BETWEEN $1 AND $2) AND "y" = $3"#);

    let err = compile(
        &PostgresDialect::new(),
        map().with("x", map().with(Op::Between, vec![1, 2, 3])),
    )
    .unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn like_keeps_patterns_verbatim() {
    let (sql, params) = pg(map().with("name", map().with(Op::Like, "%admin%")));
    assert_eq!(sql, r#""name" LIKE $1"#);
    assert_eq!(params, vec![Value::from("%admin%")]);

    // the pattern is not validated against the integer column
    let dialect = PostgresDialect::new();
    let schema = schema();
    let sql = WhereCompiler::new(&dialect)
        .with_resolver(&schema)
        .format_where_options(&map().with("age", map().with(Op::Like, "%1%")).into())
        .unwrap();
    assert!(render(&sql, &dialect, BindStyle::Positional).is_ok());
}

#[test]
fn like_any() {
    assert_eq!(
        pg_inline(map().with("name", map().with(Op::Like, map().with(Op::Any, vec!["a%", "b%"])))),
        r#""name" LIKE ANY (ARRAY['a%','b%'])"#
    );
}

#[test]
fn substring_operators() {
    let (sql, params) = pg(map().with("name", map().with(Op::StartsWith, "ab")));
    assert_eq!(sql, r#""name" LIKE $1"#);
    assert_eq!(params, vec![Value::from("ab%")]);

    let (_, params) = pg(map().with("name", map().with(Op::NotEndsWith, "ab")));
    assert_eq!(params, vec![Value::from("%ab")]);

    assert_eq!(
        pg_inline(map().with("name", map().with(Op::NotSubstring, SqlExpr::col("other")))),
        r#""name" NOT LIKE CONCAT('%', "other", '%')"#
    );

    let (sql, params) = pg(map().with("name", map().with(Op::EndsWith, 5)));
    assert_eq!(sql, r#""name" LIKE CONCAT('%', $1)"#);
    assert_eq!(params, vec![Value::Int(5)]);
}

#[test]
fn any_all_and_values() {
    assert_eq!(
        pg_inline(map().with("id", map().with(Op::Any, vec![2, 3, 4]))),
        r#""id" = ANY (ARRAY[2,3,4])"#
    );
    let (sql, params) = pg(map().with(
        "id",
        map().with(Op::Gt, map().with(Op::All, map().with(Op::Values, vec![1, 2]))),
    ));
    assert_eq!(sql, r#""id" > ALL (VALUES ($1), ($2))"#);
    assert_eq!(params, vec![Value::Int(1), Value::Int(2)]);

    let err = compile(&MySqlDialect::new(), map().with("id", map().with(Op::Any, vec![1]))).unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedOperator { operator: "any", dialect: "mysql" }));
}

#[test]
fn any_all_take_no_other_keys() {
    let dialect = PostgresDialect::new();
    let extra = map().with("id", map().with(Op::Gt, map().with(Op::Any, vec![1, 2]).with("foo", 1)));
    let err = compile(&dialect, extra).unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().contains("exactly one of"));

    let both = map().with(
        "id",
        map().with(Op::Gt, map().with(Op::Any, vec![1]).with(Op::All, vec![2])),
    );
    assert!(compile(&dialect, both).unwrap_err().is_usage());
}

#[test]
fn column_comparison() {
    assert_eq!(
        pg_inline(map().with("a", map().with(Op::Col, "users.b"))),
        r#""a" = "users"."b""#
    );
    let err = compile(&PostgresDialect::new(), map().with("a", map().with(Op::Col, 1))).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn range_contains_element_or_range() {
    assert_eq!(
        with_schema(map().with("period", map().with(Op::Contains, 5))),
        r#""period" @> 5"#
    );
    assert_eq!(
        with_schema(map().with("period", map().with(Op::Contains, RangeValue::lower_inc(1, 3)))),
        r#""period" @> '[1,3)'"#
    );
    assert_eq!(
        with_schema(map().with("period", map().with(Op::Contains, vec![1, 3]))),
        r#""period" @> '[1,3)'"#
    );
}

#[test]
fn element_contained_in_range() {
    assert_eq!(
        with_schema(map().with("age", map().with(Op::Contained, vec![18, 65]))),
        r#""age" <@ '[18,65)'"#
    );
    assert_eq!(
        with_schema(map().with("tags", map().with(Op::Contained, vec!["a"]))),
        r#""tags" <@ ARRAY['a']::TEXT[]"#
    );
}

#[test]
fn key_exists_operators() {
    assert_eq!(
        pg_inline(map().with("meta", map().with(Op::AnyKeyExists, vec!["a", "b"]))),
        r#""meta" ?| ARRAY['a','b']::TEXT[]"#
    );
    let err = compile(
        &SqliteDialect::new(),
        map().with("meta", map().with(Op::AllKeysExist, vec!["a"])),
    )
    .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn dialect_specific_keywords() {
    let sql = inline(&MySqlDialect::new(), map().with("name", map().with(Op::Regexp, "^a")));
    assert_eq!(sql, "`name` REGEXP '^a'");

    let err = compile(&MySqlDialect::new(), map().with("name", map().with(Op::ILike, "a"))).unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedOperator { operator: "iLike", .. }));
}

#[test]
fn attribute_level_logic() {
    let (sql, _) = pg(map().with("a", map().with(Op::Not, map().with(Op::Gt, 1).with(Op::Lt, 5))));
    assert_eq!(sql, r#"NOT ("a" > $1 AND "a" < $2)"#);

    let (sql, _) = pg(map().with("a", map().with(Op::Or, vec![1, 5])));
    assert_eq!(sql, r#""a" = $1 OR "a" = $2"#);

    let (sql, _) = pg(map().with("a", map().with(Op::Or, map().with(Op::Lt, 1).with(Op::Gt, 5))));
    assert_eq!(sql, r#""a" < $1 OR "a" > $2"#);
}

// ==================== Operands ====================

#[test]
fn attributes_resolve_to_columns() {
    let ts = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    assert_eq!(
        with_schema(map().with("createdAt", map().with(Op::Gte, ts))),
        r#""created_at" >= '2024-01-01 00:00:00.000 +00:00'"#
    );

    let dialect = PostgresDialect::new();
    let schema = schema();
    let sql = WhereCompiler::new(&dialect)
        .with_resolver(&schema)
        .with_prefix("User")
        .format_where_options(&map().with("createdAt", Value::Null).into())
        .unwrap();
    assert_eq!(sql.to_string(), r#""User"."created_at" IS ?"#);
}

#[test]
fn qualified_columns() {
    assert_eq!(pg_inline(map().with("$users.id$", 5)), r#""users"."id" = 5"#);
}

#[test]
fn casts() {
    let (sql, params) = pg(map().with("age::integer", 5));
    assert_eq!(sql, r#"CAST("age" AS INTEGER) = $1"#);
    assert_eq!(params, vec![Value::Int(5)]);

    let err = compile(&PostgresDialect::new(), map().with("age::int;drop", 5)).unwrap_err();
    assert!(matches!(err, QueryError::InvalidIdentifier(_)));
}

#[test]
fn json_paths_from_nested_maps() {
    assert_eq!(
        pg_inline(map().with("meta", map().with("nested", "x"))),
        r#""meta"->'nested' = '"x"'"#
    );
    assert_eq!(
        pg_inline(map().with("meta", map().with("nested", map().with("deep", 5)))),
        r##""meta"#>ARRAY['nested','deep']::VARCHAR(255)[] = '5'"##
    );
    assert_eq!(
        inline(
            &SqliteDialect::new(),
            map().with("meta", map().with("a", map().with(Op::Gt, 1)))
        ),
        "json_extract(`meta`,'$.a') > '1'"
    );
}

#[test]
fn json_paths_from_dotted_keys() {
    assert_eq!(
        pg_inline(map().with("meta.tags.0", "x")),
        r##""meta"#>ARRAY['tags','0']::VARCHAR(255)[] = '"x"'"##
    );
    assert_eq!(pg_inline(map().with("meta.0", 1)), r#""meta"->0 = '1'"#);
    assert_eq!(
        pg_inline(map().with("meta.count::integer", map().with(Op::Gt, 2))),
        r#"CAST("meta"->'count' AS INTEGER) > 2"#
    );
    assert_eq!(
        pg_inline(map().with("meta", map().with("count::integer", 2))),
        r#"CAST("meta"->'count' AS INTEGER) = 2"#
    );
}

#[test]
fn non_json_attributes_reject_nested_keys() {
    let dialect = PostgresDialect::new();
    let schema = schema();
    let err = WhereCompiler::new(&dialect)
        .with_resolver(&schema)
        .format_where_options(&map().with("name", map().with("nested", 1)).into())
        .unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn nested_comparisons_as_operands_are_parenthesized() {
    let cond = map().with(
        "flag",
        SqlExpr::where_op(
            SqlExpr::func("lower", vec![SqlExpr::col("name")]),
            Op::Is,
            Value::Null,
        ),
    );
    assert_eq!(pg_inline(cond), r#""flag" = (lower("name") IS NULL)"#);
}

#[test]
fn function_names_are_validated() {
    let err = compile(
        &PostgresDialect::new(),
        SqlExpr::where_op(SqlExpr::func("lower(); drop", vec![]), Op::Eq, 1),
    )
    .unwrap_err();
    assert!(matches!(err, QueryError::InvalidIdentifier(_)));
}

// ==================== MySQL ====================

#[test]
fn mysql_compares_json_as_documents() {
    let dialect = MySqlDialect::new();
    let schema = Schema::new().field("jsonAttr", DataType::Json);
    let compiler = WhereCompiler::new(&dialect).with_resolver(&schema);

    let sql = compiler
        .format_where_options(&map().with("jsonAttr", map().with("nested", "value")).into())
        .unwrap();
    assert_eq!(
        render(&sql, &dialect, BindStyle::Inline).unwrap().sql,
        r#"json_extract(`jsonAttr`,'$.nested') = CAST('\"value\"' AS JSON)"#
    );
    let q = render(&sql, &dialect, BindStyle::Positional).unwrap();
    assert_eq!(q.sql, "json_extract(`jsonAttr`,'$.nested') = CAST(? AS JSON)");
    assert_eq!(q.params, vec![Value::Json(serde_json::json!("value"))]);

    assert_eq!(
        inline(&dialect, map().with("meta", map().with("count", 1))),
        "json_extract(`meta`,'$.count') = CAST('1' AS JSON)"
    );
    assert_eq!(
        inline(&dialect, map().with("meta.tags", map().with(Op::In, vec![1, 2]))),
        "json_extract(`meta`,'$.tags') IN (CAST('1' AS JSON), CAST('2' AS JSON))"
    );
}

#[test]
fn mysql_negation_survives_backslash_escaped_quotes() {
    let cond = map().with(
        Op::Not,
        map().with(
            Op::Or,
            vec![
                Condition::map(map().with("m.a'b", 1).with("x", 1)),
                Condition::map(map().with("m.c'd", 1).with("y", 1)),
            ],
        ),
    );
    assert_eq!(
        inline(&MySqlDialect::new(), cond),
        r#"NOT ((json_extract(`m`,'$.\"a\'b\"') = CAST('1' AS JSON) AND `x` = 1) OR (json_extract(`m`,'$.\"c\'d\"') = CAST('1' AS JSON) AND `y` = 1))"#
    );
}
