use super::*;
use crate::operators::Op;
use crate::value::RangeValue;
use chrono::TimeZone;

fn pg() -> PostgresDialect {
    PostgresDialect::new()
}

#[test]
fn identifiers_are_quoted_per_engine() {
    assert_eq!(pg().quote_identifier(r#"we"ird"#), r#""we""ird""#);
    assert_eq!(MySqlDialect::new().quote_identifier("a`b"), "`a``b`");
    assert_eq!(SqliteDialect::new().quote_identifier("name"), "`name`");
}

#[test]
fn strings_are_escaped_per_engine() {
    assert_eq!(pg().escape_string("it's"), "'it''s'");
    assert_eq!(SqliteDialect::new().escape_string("it's"), "'it''s'");
    assert_eq!(MySqlDialect::new().escape_string("it's \\ \n"), r"'it\'s \\ \n'");
}

#[test]
fn booleans() {
    let t = Value::Bool(true);
    assert_eq!(pg().escape(&t, None).unwrap(), "true");
    assert_eq!(MySqlDialect::new().escape(&t, None).unwrap(), "true");
    assert_eq!(SqliteDialect::new().escape(&Value::Bool(false), None).unwrap(), "0");
}

#[test]
fn scalars() {
    let d = pg();
    assert_eq!(d.escape(&Value::Null, None).unwrap(), "NULL");
    assert_eq!(d.escape(&Value::Int(-4), None).unwrap(), "-4");
    assert_eq!(d.escape(&Value::Float(1.5), None).unwrap(), "1.5");
    assert_eq!(d.escape(&Value::Float(f64::NAN), None).unwrap(), "'NaN'");
    assert_eq!(d.escape(&Value::Bytes(vec![1, 0xab]), None).unwrap(), r"'\x01ab'");
    assert_eq!(
        SqliteDialect::new().escape(&Value::Bytes(vec![1, 0xab]), None).unwrap(),
        "X'01ab'"
    );

    let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(d.escape(&Value::Date(date), None).unwrap(), "'2024-02-29'");

    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(
        d.escape(&Value::Timestamp(ts), None).unwrap(),
        "'2024-01-02 03:04:05.000 +00:00'"
    );
    assert_eq!(
        MySqlDialect::new().escape(&Value::Timestamp(ts), None).unwrap(),
        "'2024-01-02 03:04:05.000'"
    );
}

#[test]
fn json_typed_values_are_serialized() {
    let d = pg();
    assert_eq!(
        d.escape(&Value::Text("value".into()), Some(&DataType::Jsonb)).unwrap(),
        r#"'"value"'"#
    );
    assert_eq!(d.escape(&Value::Int(1), Some(&DataType::Json)).unwrap(), "'1'");
    assert_eq!(d.escape(&Value::Null, Some(&DataType::Json)).unwrap(), "NULL");
}

#[test]
fn postgres_arrays() {
    let d = pg();
    let ints = Value::from(vec![2, 3, 4]);
    assert_eq!(
        d.escape(&ints, Some(&DataType::array(DataType::Integer))).unwrap(),
        "ARRAY[2,3,4]"
    );
    let texts = Value::from(vec!["a", "b"]);
    assert_eq!(
        d.escape(&texts, Some(&DataType::array(DataType::Text))).unwrap(),
        "ARRAY['a','b']::TEXT[]"
    );
    assert_eq!(d.escape(&texts, None).unwrap(), "ARRAY['a','b']");
}

#[test]
fn arrays_are_unsupported_elsewhere() {
    let err = MySqlDialect::new()
        .escape(&Value::from(vec![1]), None)
        .unwrap_err();
    assert!(err.is_unsupported());
    assert!(!SqliteDialect::new().supports_arrays());
}

#[test]
fn postgres_ranges() {
    let d = pg();
    let r = Value::from(RangeValue::lower_inc(1, 10));
    assert_eq!(d.escape(&r, None).unwrap(), "'[1,10)'");
    assert_eq!(d.escape(&Value::from(RangeValue::empty()), None).unwrap(), "'empty'");

    let pair = Value::from(vec![1, 5]);
    assert_eq!(
        d.escape(&pair, Some(&DataType::range(DataType::Integer))).unwrap(),
        "'[1,5)'"
    );

    let text = Value::from(RangeValue::lower_inc("a\\b", "c\"d'e"));
    assert_eq!(d.escape(&text, None).unwrap(), r#"'["a\\b","c\"d''e")'"#);
}

#[test]
fn json_paths() {
    let col = || Composition::text("\"meta\"");

    let one = pg().json_path(col(), &[PathSegment::from("nested")]).unwrap();
    assert_eq!(one.to_string(), r#""meta"->'nested'"#);

    let idx = pg().json_path(col(), &[PathSegment::Index(0)]).unwrap();
    assert_eq!(idx.to_string(), r#""meta"->0"#);

    let many = pg()
        .json_path(col(), &[PathSegment::from("nested"), PathSegment::from("twice")])
        .unwrap();
    assert_eq!(
        many.to_string(),
        r##""meta"#>ARRAY['nested','twice']::VARCHAR(255)[]"##
    );

    let sqlite = SqliteDialect::new()
        .json_path(Composition::text("`meta`"), &[PathSegment::from("a"), PathSegment::Index(2)])
        .unwrap();
    assert_eq!(sqlite.to_string(), "json_extract(`meta`,'$.a[2]')");

    let quoted = MySqlDialect::new()
        .json_path(Composition::text("`meta`"), &[PathSegment::from("a b")])
        .unwrap();
    assert_eq!(quoted.to_string(), r#"json_extract(`meta`,'$.\"a b\"')"#);
}

#[test]
fn pagination() {
    let mut out = String::new();
    pg().write_pagination(&mut out, Some(10), Some(20));
    assert_eq!(out, "LIMIT 10 OFFSET 20");

    out.clear();
    MySqlDialect::new().write_pagination(&mut out, Some(10), Some(20));
    assert_eq!(out, "LIMIT 20, 10");

    out.clear();
    SqliteDialect::new().write_pagination(&mut out, None, Some(5));
    assert_eq!(out, "LIMIT -1 OFFSET 5");

    out.clear();
    pg().write_pagination(&mut out, None, Some(0));
    assert!(out.is_empty());
}

#[test]
fn locks() {
    let mut out = String::new();
    pg().write_lock(&mut out, LockMode::NoKeyUpdate).unwrap();
    assert_eq!(out, "FOR NO KEY UPDATE");

    out.clear();
    MySqlDialect::new().write_lock(&mut out, LockMode::Share).unwrap();
    assert_eq!(out, "LOCK IN SHARE MODE");

    assert!(SqliteDialect::new().write_lock(&mut out, LockMode::Update).is_err());
}

#[test]
fn operator_tables_differ() {
    assert_eq!(MySqlDialect::new().operators().get(Op::Regexp), Some("REGEXP"));
    assert_eq!(pg().operators().get(Op::Regexp), Some("~"));
    assert!(!SqliteDialect::new().operators().supports(Op::ILike));
    assert!(pg().operators().supports(Op::ILike));
}

#[test]
fn placeholders() {
    let mut out = String::new();
    pg().write_bind_placeholder(&mut out, 3);
    MySqlDialect::new().write_bind_placeholder(&mut out, 4);
    assert_eq!(out, "$3?");
}

#[test]
fn default_values() {
    let mut out = String::new();
    pg().write_default_value(&mut out);
    SqliteDialect::new().write_default_value(&mut out);
    assert_eq!(out, "DEFAULTNULL");
}
